//! Turns the terminal state of a timer session into a persisted run.

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Run;
use crate::projects::{ops, store::modify, ProjectStore};

use super::{LaunchParams, TimerSession};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Seconds spent in the session, whichever mode the clock ended in.
/// Exiting mid-run records the partial time.
pub fn final_duration(session: &TimerSession) -> u64 {
    u64::try_from(session.time_used()).unwrap_or(0)
}

pub fn build_run(name: &str, session: &TimerSession, date: DateTime<Utc>) -> Run {
    Run {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        date,
        duration: final_duration(session),
        mode: session.mode(),
    }
}

/// Appends `run` to its project with a whole-collection read-modify-write.
pub async fn record_run<S: ProjectStore>(store: &S, project_id: &str, run: Run) -> Result<()> {
    modify(store, |projects| {
        ops::append_run(projects, project_id, run)?;
        Ok(())
    })
    .await
}

/// Records the session if it belongs to a project. Quick-start sessions and
/// save failures return `None`; a failed save is logged and not retried.
pub async fn finish_session<S: ProjectStore>(
    store: &S,
    params: &LaunchParams,
    session: &TimerSession,
) -> Option<Run> {
    let project_id = match (&params.project_id, params.is_quick_start) {
        (Some(project_id), false) => project_id,
        _ => {
            log_info!(
                "Discarding quick-start session after {}s",
                final_duration(session)
            );
            return None;
        }
    };

    let name = params
        .run_name
        .clone()
        .unwrap_or_else(|| "Run".to_string());
    let run = build_run(&name, session, Utc::now());

    match record_run(store, project_id, run.clone()).await {
        Ok(()) => {
            log_info!(
                "Saved run {} ({}s, {}) for project {}",
                run.id,
                run.duration,
                run.mode.as_str(),
                project_id
            );
            Some(run)
        }
        Err(err) => {
            log_error!("Error saving run for project {}: {err:#}", project_id);
            None
        }
    }
}
