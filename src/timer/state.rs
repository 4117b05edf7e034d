use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::format_clock;

/// Number of laps shown next to the clock; older laps stay in the session.
pub const VISIBLE_LAPS: usize = 5;

/// Remaining seconds at which a stopwatch turns red before the target is reached.
const FINAL_MINUTE_SECS: i64 = 60;
/// Fraction of the target after which a stopwatch turns amber.
const AMBER_PROGRESS: f64 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// Launched, never started.
    Idle,
    Running,
    Paused,
    /// Reset back to the zero point; `start` runs it again.
    Ready,
    /// Terminal: the timer screen was left.
    Stopped,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Countdown,
    Stopwatch,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Countdown
    }
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Stopwatch => "stopwatch",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TimerMode::Countdown => TimerMode::Stopwatch,
            TimerMode::Stopwatch => TimerMode::Countdown,
        }
    }
}

/// Colour cue for the clock face.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerColor {
    Neutral,
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub index: u32,
    pub split_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Reset,
    Lap,
    ToggleMode,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot {action:?} while the timer is {status:?}")]
    InvalidTransition {
        action: TimerAction,
        status: TimerStatus,
    },
}

/// In-memory state of the active practice timer. Never persisted.
///
/// `elapsed` is what the clock shows: seconds remaining in countdown mode
/// (negative once overtime) and seconds counted up in stopwatch mode.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSession {
    target_secs: i64,
    elapsed_secs: i64,
    mode: TimerMode,
    status: TimerStatus,
    /// Most recent first.
    laps: Vec<Lap>,
    /// Whether the overtime blink process should be running.
    blink_active: bool,
    /// Current phase of the blink; the clock is dimmed while set.
    blink_on: bool,
}

impl TimerSession {
    pub fn new(target_secs: u32, mode: TimerMode) -> Self {
        let target_secs = i64::from(target_secs);
        Self {
            target_secs,
            elapsed_secs: zero_point(mode, target_secs),
            mode,
            status: TimerStatus::Idle,
            laps: Vec::new(),
            blink_active: false,
            blink_on: false,
        }
    }

    pub fn target_secs(&self) -> i64 {
        self.target_secs
    }

    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_secs
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused
    }

    /// True while the 1-second tick should be firing.
    pub fn is_ticking(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn blink_active(&self) -> bool {
        self.blink_active
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn visible_laps(&self) -> &[Lap] {
        &self.laps[..self.laps.len().min(VISIBLE_LAPS)]
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Ready => {
                self.status = TimerStatus::Running;
                Ok(())
            }
            status => Err(invalid(TimerAction::Start, status)),
        }
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        match self.status {
            TimerStatus::Running => {
                self.status = TimerStatus::Paused;
                Ok(())
            }
            status => Err(invalid(TimerAction::Pause, status)),
        }
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        match self.status {
            TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                Ok(())
            }
            status => Err(invalid(TimerAction::Resume, status)),
        }
    }

    /// The timer screen's main button: start, pause or resume depending on
    /// where the session is. Returns the action that was taken.
    pub fn primary_action(&mut self) -> Result<TimerAction, TimerError> {
        match self.status {
            TimerStatus::Running => self.pause().map(|_| TimerAction::Pause),
            TimerStatus::Paused => self.resume().map(|_| TimerAction::Resume),
            _ => self.start().map(|_| TimerAction::Start),
        }
    }

    /// Back to the mode's zero point with laps and overtime blinking cleared.
    /// The target itself is unchanged.
    pub fn reset(&mut self) -> Result<(), TimerError> {
        if !self.is_running() {
            return Err(invalid(TimerAction::Reset, self.status));
        }
        self.status = TimerStatus::Ready;
        self.elapsed_secs = zero_point(self.mode, self.target_secs);
        self.laps.clear();
        self.blink_active = false;
        self.blink_on = false;
        Ok(())
    }

    /// One second of wall time. No-op unless running.
    pub fn tick(&mut self) {
        if !self.is_ticking() {
            return;
        }
        match self.mode {
            TimerMode::Countdown => {
                self.elapsed_secs -= 1;
            }
            TimerMode::Stopwatch => {
                self.elapsed_secs += 1;
                if self.elapsed_secs > self.target_secs {
                    self.blink_active = true;
                }
            }
        }
    }

    /// One phase of the overtime blink. No-op unless the blink is active.
    pub fn blink_toggle(&mut self) {
        if self.blink_active {
            self.blink_on = !self.blink_on;
        }
    }

    /// Records the time spent so far. Only allowed while running and not paused.
    pub fn lap(&mut self) -> Result<&Lap, TimerError> {
        if !self.is_ticking() {
            return Err(invalid(TimerAction::Lap, self.status));
        }
        let lap = Lap {
            index: self.laps.len() as u32 + 1,
            split_time: format_clock(self.time_used()),
        };
        self.laps.insert(0, lap);
        Ok(&self.laps[0])
    }

    /// Switches between countdown and stopwatch without losing time:
    /// time remaining becomes time elapsed and vice versa.
    pub fn toggle_mode(&mut self) -> Result<TimerMode, TimerError> {
        if self.status == TimerStatus::Stopped {
            return Err(invalid(TimerAction::ToggleMode, self.status));
        }
        self.mode = self.mode.toggled();
        self.elapsed_secs = self.target_secs - self.elapsed_secs;
        self.blink_active = self.mode == TimerMode::Stopwatch && self.is_overtime();
        if !self.blink_active {
            self.blink_on = false;
        }
        Ok(self.mode)
    }

    /// Leaves the timer screen. Idempotent.
    pub fn stop(&mut self) {
        self.status = TimerStatus::Stopped;
        self.blink_active = false;
        self.blink_on = false;
    }

    /// Seconds actually spent, whichever way the clock is counting.
    pub fn time_used(&self) -> i64 {
        match self.mode {
            TimerMode::Countdown => self.target_secs - self.elapsed_secs,
            TimerMode::Stopwatch => self.elapsed_secs,
        }
    }

    pub fn is_overtime(&self) -> bool {
        match self.mode {
            TimerMode::Countdown => self.elapsed_secs < 0,
            TimerMode::Stopwatch => self.elapsed_secs > self.target_secs,
        }
    }

    pub fn color(&self) -> TimerColor {
        match self.mode {
            TimerMode::Countdown => {
                if self.elapsed_secs < 0 {
                    TimerColor::Red
                } else {
                    TimerColor::Neutral
                }
            }
            TimerMode::Stopwatch => {
                if self.elapsed_secs > self.target_secs {
                    return TimerColor::Red;
                }
                if self.target_secs - self.elapsed_secs <= FINAL_MINUTE_SECS {
                    return TimerColor::Red;
                }
                let progress = if self.target_secs == 0 {
                    1.0
                } else {
                    self.elapsed_secs as f64 / self.target_secs as f64
                };
                if progress >= AMBER_PROGRESS {
                    TimerColor::Amber
                } else {
                    TimerColor::Green
                }
            }
        }
    }

    /// Whether the clock is in the dim half of the overtime blink.
    pub fn is_dimmed(&self) -> bool {
        self.mode == TimerMode::Stopwatch && self.is_overtime() && self.blink_on
    }

    pub fn display(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            mode: self.mode,
            target_secs: self.target_secs,
            elapsed_secs: self.elapsed_secs,
            display: self.display(),
            color: self.color(),
            dimmed: self.is_dimmed(),
            laps: self.visible_laps().to_vec(),
            lap_count: self.laps.len(),
        }
    }
}

/// Render-ready view of a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub mode: TimerMode,
    pub target_secs: i64,
    pub elapsed_secs: i64,
    pub display: String,
    pub color: TimerColor,
    pub dimmed: bool,
    pub laps: Vec<Lap>,
    pub lap_count: usize,
}

fn zero_point(mode: TimerMode, target_secs: i64) -> i64 {
    match mode {
        TimerMode::Countdown => target_secs,
        TimerMode::Stopwatch => 0,
    }
}

fn invalid(action: TimerAction, status: TimerStatus) -> TimerError {
    TimerError::InvalidTransition { action, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(target: u32, mode: TimerMode) -> TimerSession {
        let mut session = TimerSession::new(target, mode);
        session.start().unwrap();
        session
    }

    fn ticks(session: &mut TimerSession, n: usize) {
        for _ in 0..n {
            session.tick();
        }
    }

    #[test]
    fn new_session_starts_at_zero_point() {
        let countdown = TimerSession::new(90, TimerMode::Countdown);
        assert_eq!(countdown.elapsed_secs(), 90);
        assert_eq!(countdown.status(), TimerStatus::Idle);

        let stopwatch = TimerSession::new(90, TimerMode::Stopwatch);
        assert_eq!(stopwatch.elapsed_secs(), 0);
        assert!(!stopwatch.is_running());
    }

    #[test]
    fn ticks_are_ignored_until_started() {
        let mut session = TimerSession::new(10, TimerMode::Countdown);
        ticks(&mut session, 3);
        assert_eq!(session.elapsed_secs(), 10);
    }

    #[test]
    fn countdown_runs_into_overtime() {
        let mut session = running(10, TimerMode::Countdown);
        ticks(&mut session, 12);
        assert_eq!(session.elapsed_secs(), -2);
        assert_eq!(session.display(), "-00:02");
        assert_eq!(session.color(), TimerColor::Red);
        assert!(!session.blink_active());
    }

    #[test]
    fn stopwatch_overtime_activates_blink_until_reset() {
        let mut session = running(5, TimerMode::Stopwatch);
        ticks(&mut session, 5);
        assert!(!session.blink_active());
        session.tick();
        assert_eq!(session.elapsed_secs(), 6);
        assert!(session.blink_active());

        session.blink_toggle();
        assert!(session.is_dimmed());

        session.reset().unwrap();
        assert!(!session.blink_active());
        assert!(!session.is_dimmed());
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.status(), TimerStatus::Ready);
    }

    #[test]
    fn pause_keeps_blink_and_freezes_time() {
        let mut session = running(1, TimerMode::Stopwatch);
        ticks(&mut session, 2);
        session.pause().unwrap();
        ticks(&mut session, 5);
        assert_eq!(session.elapsed_secs(), 2);
        assert!(session.blink_active());

        session.resume().unwrap();
        session.tick();
        assert_eq!(session.elapsed_secs(), 3);
    }

    #[test]
    fn reset_returns_to_mode_zero_point() {
        let mut session = running(30, TimerMode::Countdown);
        ticks(&mut session, 4);
        session.lap().unwrap();
        session.reset().unwrap();
        assert_eq!(session.elapsed_secs(), 30);
        assert_eq!(session.target_secs(), 30);
        assert!(session.laps().is_empty());

        session.start().unwrap();
        session.tick();
        assert_eq!(session.elapsed_secs(), 29);
    }

    #[test]
    fn reset_requires_started_session() {
        let mut session = TimerSession::new(30, TimerMode::Countdown);
        assert_eq!(
            session.reset(),
            Err(TimerError::InvalidTransition {
                action: TimerAction::Reset,
                status: TimerStatus::Idle,
            })
        );
    }

    #[test]
    fn toggle_is_an_involution() {
        for elapsed_ticks in [0usize, 3, 10, 14] {
            let mut session = running(10, TimerMode::Countdown);
            ticks(&mut session, elapsed_ticks);
            let before = session.elapsed_secs();
            session.toggle_mode().unwrap();
            assert_eq!(session.elapsed_secs(), 10 - before);
            session.toggle_mode().unwrap();
            assert_eq!(session.elapsed_secs(), before);
            assert_eq!(session.mode(), TimerMode::Countdown);
        }
    }

    #[test]
    fn toggle_keeps_time_used_and_laps() {
        let mut session = running(60, TimerMode::Countdown);
        ticks(&mut session, 15);
        session.lap().unwrap();
        session.toggle_mode().unwrap();
        assert_eq!(session.mode(), TimerMode::Stopwatch);
        assert_eq!(session.elapsed_secs(), 15);
        assert_eq!(session.time_used(), 15);
        assert_eq!(session.laps().len(), 1);
        assert!(session.is_ticking());

        session.tick();
        assert_eq!(session.elapsed_secs(), 16);
    }

    #[test]
    fn toggle_recomputes_blink() {
        let mut session = running(3, TimerMode::Stopwatch);
        ticks(&mut session, 5);
        session.blink_toggle();
        assert!(session.blink_active());

        session.toggle_mode().unwrap();
        assert_eq!(session.elapsed_secs(), -2);
        assert!(!session.blink_active());
        assert!(!session.is_dimmed());
        assert_eq!(session.color(), TimerColor::Red);

        session.toggle_mode().unwrap();
        assert!(session.blink_active());
    }

    #[test]
    fn lap_rejected_unless_ticking() {
        let mut session = TimerSession::new(20, TimerMode::Stopwatch);
        assert!(session.lap().is_err());

        session.start().unwrap();
        session.tick();
        session.pause().unwrap();
        assert!(session.lap().is_err());
        assert!(session.laps().is_empty());
    }

    #[test]
    fn laps_record_time_spent_most_recent_first() {
        let mut session = running(100, TimerMode::Countdown);
        ticks(&mut session, 65);
        assert_eq!(session.lap().unwrap().split_time, "01:05");
        session.toggle_mode().unwrap();
        ticks(&mut session, 5);
        assert_eq!(session.lap().unwrap().split_time, "01:10");

        let indexes: Vec<u32> = session.laps().iter().map(|lap| lap.index).collect();
        assert_eq!(indexes, vec![2, 1]);
    }

    #[test]
    fn only_five_laps_are_visible() {
        let mut session = running(100, TimerMode::Stopwatch);
        for _ in 0..7 {
            session.tick();
            session.lap().unwrap();
        }
        assert_eq!(session.laps().len(), 7);
        let visible: Vec<u32> = session.visible_laps().iter().map(|lap| lap.index).collect();
        assert_eq!(visible, vec![7, 6, 5, 4, 3]);
        assert_eq!(session.snapshot().lap_count, 7);
    }

    #[test]
    fn stopwatch_color_thresholds() {
        let mut session = running(300, TimerMode::Stopwatch);
        assert_eq!(session.color(), TimerColor::Green);
        ticks(&mut session, 209);
        assert_eq!(session.color(), TimerColor::Green);
        session.tick();
        assert_eq!(session.color(), TimerColor::Amber);
        ticks(&mut session, 29);
        assert_eq!(session.elapsed_secs(), 239);
        assert_eq!(session.color(), TimerColor::Amber);
        session.tick();
        assert_eq!(session.color(), TimerColor::Red);
        ticks(&mut session, 61);
        assert!(session.is_overtime());
        assert_eq!(session.color(), TimerColor::Red);
    }

    #[test]
    fn short_stopwatch_target_is_red_from_the_start() {
        let session = running(45, TimerMode::Stopwatch);
        assert_eq!(session.color(), TimerColor::Red);

        let zero = running(0, TimerMode::Stopwatch);
        assert_eq!(zero.color(), TimerColor::Red);
    }

    #[test]
    fn countdown_color_is_neutral_until_overtime() {
        let mut session = running(2, TimerMode::Countdown);
        ticks(&mut session, 2);
        assert_eq!(session.color(), TimerColor::Neutral);
        session.tick();
        assert_eq!(session.color(), TimerColor::Red);
    }

    #[test]
    fn primary_action_cycles_start_pause_resume() {
        let mut session = TimerSession::new(10, TimerMode::Countdown);
        assert_eq!(session.primary_action(), Ok(TimerAction::Start));
        assert_eq!(session.primary_action(), Ok(TimerAction::Pause));
        assert_eq!(session.primary_action(), Ok(TimerAction::Resume));
        session.reset().unwrap();
        assert_eq!(session.primary_action(), Ok(TimerAction::Start));
    }

    #[test]
    fn stopped_session_rejects_everything() {
        let mut session = running(10, TimerMode::Stopwatch);
        session.stop();
        assert!(session.start().is_err());
        assert!(session.toggle_mode().is_err());
        assert!(session.reset().is_err());
        session.tick();
        assert_eq!(session.elapsed_secs(), 0);
    }
}
