use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

use super::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub duration: Duration,
    pub word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Project {
    pub fn has_script(&self) -> bool {
        self.script_name.is_some()
    }

    /// Name proposed for the next practice run of this project.
    pub fn next_run_name(&self) -> String {
        format!("Run #{}", self.runs.len() + 1)
    }

    pub fn find_run(&self, run_id: &str) -> Option<&Run> {
        self.runs.iter().find(|run| run.id == run_id)
    }
}

/// One recorded practice session. `duration` is seconds actually spent,
/// independent of which mode the timer was showing at exit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub duration: u64,
    #[serde(rename = "type")]
    pub mode: TimerMode,
}

impl Run {
    pub fn duration_label(&self) -> String {
        format!("{}:{:02}", self.duration / 60, self.duration % 60)
    }
}
