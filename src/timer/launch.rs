//! Turns a project or a quick-start choice into the initial timer session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Duration, Project};

use super::{TimerMode, TimerSession};

/// Quick-start preset durations in seconds (1, 3, 5, 10, 15 and 30 minutes).
pub const QUICK_START_PRESETS: [u32; 6] = [60, 180, 300, 600, 900, 1800];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Please enter a valid duration")]
    ZeroDuration,
    #[error("Please select a duration")]
    NoDuration,
    #[error("{0} seconds is not a quick-start preset")]
    UnknownPreset(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickStartChoice {
    /// One of [`QUICK_START_PRESETS`], in seconds.
    Preset(u32),
    Custom(Duration),
}

/// Everything the timer screen needs to know about the session it hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchParams {
    pub total_duration_secs: u32,
    pub mode: TimerMode,
    pub project_id: Option<String>,
    pub run_name: Option<String>,
    pub is_quick_start: bool,
}

impl LaunchParams {
    /// Project-bound run. The project's duration was validated when it was saved.
    pub fn for_project(project: &Project, mode: TimerMode) -> Self {
        Self {
            total_duration_secs: project.duration.total_seconds(),
            mode,
            project_id: Some(project.id.clone()),
            run_name: Some(project.next_run_name()),
            is_quick_start: false,
        }
    }

    /// Ad-hoc run that is never recorded. `None` means nothing was selected.
    pub fn quick_start(choice: Option<QuickStartChoice>, mode: TimerMode) -> Result<Self, LaunchError> {
        let total_duration_secs = match choice.ok_or(LaunchError::NoDuration)? {
            QuickStartChoice::Preset(secs) => {
                if !QUICK_START_PRESETS.contains(&secs) {
                    return Err(LaunchError::UnknownPreset(secs));
                }
                secs
            }
            QuickStartChoice::Custom(duration) => {
                if duration.is_zero() {
                    return Err(LaunchError::ZeroDuration);
                }
                duration.total_seconds()
            }
        };

        Ok(Self {
            total_duration_secs,
            mode,
            project_id: None,
            run_name: None,
            is_quick_start: true,
        })
    }

    pub fn target(&self) -> Duration {
        Duration::from_total_seconds(self.total_duration_secs)
    }

    pub fn new_session(&self) -> TimerSession {
        TimerSession::new(self.total_duration_secs, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerStatus;

    fn project() -> Project {
        Project {
            id: "1700000000000".into(),
            name: "Demo day".into(),
            duration: Duration::normalize(4, 30),
            word_count: 500,
            script_name: None,
            runs: Vec::new(),
        }
    }

    #[test]
    fn project_launch_uses_stored_duration() {
        let params = LaunchParams::for_project(&project(), TimerMode::Countdown);
        assert_eq!(params.total_duration_secs, 270);
        assert_eq!(params.project_id.as_deref(), Some("1700000000000"));
        assert_eq!(params.run_name.as_deref(), Some("Run #1"));
        assert!(!params.is_quick_start);

        let session = params.new_session();
        assert_eq!(session.elapsed_secs(), 270);
        assert_eq!(session.status(), TimerStatus::Idle);
    }

    #[test]
    fn stopwatch_launch_starts_from_zero() {
        let params = LaunchParams::for_project(&project(), TimerMode::Stopwatch);
        let session = params.new_session();
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.target_secs(), 270);
    }

    #[test]
    fn presets_launch_as_quick_start() {
        for secs in QUICK_START_PRESETS {
            let params =
                LaunchParams::quick_start(Some(QuickStartChoice::Preset(secs)), TimerMode::Countdown)
                    .unwrap();
            assert_eq!(params.total_duration_secs, secs);
            assert!(params.is_quick_start);
            assert!(params.project_id.is_none());
        }
        assert_eq!(
            LaunchParams::quick_start(Some(QuickStartChoice::Preset(42)), TimerMode::Countdown),
            Err(LaunchError::UnknownPreset(42))
        );
    }

    #[test]
    fn custom_quick_start_normalizes_and_rejects_zero() {
        let params = LaunchParams::quick_start(
            Some(QuickStartChoice::Custom(Duration::from_input("1", "75"))),
            TimerMode::Stopwatch,
        )
        .unwrap();
        assert_eq!(params.total_duration_secs, 135);
        assert_eq!(params.target(), Duration { minutes: 2, seconds: 15 });

        assert_eq!(
            LaunchParams::quick_start(
                Some(QuickStartChoice::Custom(Duration::from_input("", "0"))),
                TimerMode::Countdown
            ),
            Err(LaunchError::ZeroDuration)
        );
        assert_eq!(
            LaunchParams::quick_start(None, TimerMode::Countdown),
            Err(LaunchError::NoDuration)
        );
    }
}
