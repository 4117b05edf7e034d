//! Form-boundary operations on the project collection. All of these are
//! pure over `Vec<Project>`; persistence goes through [`super::store::modify`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::estimator::DocumentInfo;
use crate::models::{Duration, Project, Run};

const DEFAULT_NAME: &str = "Untitled";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a project name")]
    EmptyName,
    #[error("Duration cannot be zero")]
    ZeroDuration,
    #[error("Please upload a script or enter word count manually")]
    MissingWordCount,
    #[error("Word count is automatically calculated from uploaded script")]
    WordCountFromScript,
    #[error("Run name cannot be empty")]
    EmptyRunName,
    #[error("project {0} not found")]
    UnknownProject(String),
    #[error("run {0} not found")]
    UnknownRun(String),
}

/// Contents of the new-project form.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub duration: Duration,
    /// Manually entered count; ignored when a script is attached.
    pub word_count: Option<u32>,
    pub script: Option<DocumentInfo>,
}

/// First of `Untitled`, `Untitled 1`, `Untitled 2`, ... not used by any project.
pub fn default_project_name(projects: &[Project]) -> String {
    let taken = |name: &str| projects.iter().any(|project| project.name == name);

    let mut candidate = DEFAULT_NAME.to_string();
    let mut counter = 1;
    while taken(&candidate) {
        candidate = format!("{DEFAULT_NAME} {counter}");
        counter += 1;
    }
    candidate
}

pub fn create_project(
    projects: &mut Vec<Project>,
    draft: ProjectDraft,
    now: DateTime<Utc>,
) -> Result<Project, ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let duration = Duration::normalize(draft.duration.minutes, draft.duration.seconds);
    if duration.is_zero() {
        return Err(ValidationError::ZeroDuration);
    }
    let (word_count, script_name) = match draft.script {
        Some(script) => (script.word_count, Some(script.name)),
        None => (
            draft.word_count.ok_or(ValidationError::MissingWordCount)?,
            None,
        ),
    };

    let project = Project {
        id: timestamp_id(projects, now),
        name: draft.name,
        duration,
        word_count,
        script_name,
        runs: Vec::new(),
    };
    projects.push(project.clone());
    Ok(project)
}

/// Millisecond creation timestamp, bumped past any id already in use.
fn timestamp_id(projects: &[Project], now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    while projects.iter().any(|project| project.id == millis.to_string()) {
        millis += 1;
    }
    millis.to_string()
}

pub fn find_project<'a>(projects: &'a [Project], id: &str) -> Result<&'a Project, ValidationError> {
    projects
        .iter()
        .find(|project| project.id == id)
        .ok_or_else(|| ValidationError::UnknownProject(id.to_string()))
}

pub fn find_project_mut<'a>(
    projects: &'a mut [Project],
    id: &str,
) -> Result<&'a mut Project, ValidationError> {
    projects
        .iter_mut()
        .find(|project| project.id == id)
        .ok_or_else(|| ValidationError::UnknownProject(id.to_string()))
}

pub fn update_duration(project: &mut Project, duration: Duration) -> Result<(), ValidationError> {
    let duration = Duration::normalize(duration.minutes, duration.seconds);
    if duration.is_zero() {
        return Err(ValidationError::ZeroDuration);
    }
    project.duration = duration;
    Ok(())
}

/// Manual word count; locked while a script is attached.
pub fn set_word_count(project: &mut Project, word_count: u32) -> Result<(), ValidationError> {
    if project.has_script() {
        return Err(ValidationError::WordCountFromScript);
    }
    project.word_count = word_count;
    Ok(())
}

pub fn attach_script(project: &mut Project, script: DocumentInfo) {
    project.word_count = script.word_count;
    project.script_name = Some(script.name);
}

/// Detaches the script and unlocks manual entry. The word count is kept.
pub fn remove_script(project: &mut Project) {
    project.script_name = None;
}

/// Choice made on a run in the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunAction {
    Rename(String),
    Delete,
}

pub fn apply_run_action(
    project: &mut Project,
    run_id: &str,
    action: RunAction,
) -> Result<(), ValidationError> {
    let index = project
        .runs
        .iter()
        .position(|run| run.id == run_id)
        .ok_or_else(|| ValidationError::UnknownRun(run_id.to_string()))?;

    match action {
        RunAction::Rename(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyRunName);
            }
            project.runs[index].name = name.to_string();
        }
        RunAction::Delete => {
            project.runs.remove(index);
        }
    }
    Ok(())
}

/// Appends a finished run. Runs never move between projects.
pub fn append_run(projects: &mut [Project], project_id: &str, run: Run) -> Result<(), ValidationError> {
    find_project_mut(projects, project_id)?.runs.push(run);
    Ok(())
}
