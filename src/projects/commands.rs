//! Command handlers for project management and run history. Each returns
//! the text to print.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::cli::{DurationArgs, NewArgs, RenameRunArgs, RunRef, ScriptArgs, WordsArgs};
use crate::estimator;
use crate::models::{Duration, Project};

use super::ops::{self, ProjectDraft, RunAction};
use super::store::{load_or_empty, modify};
use super::ProjectStore;

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

pub async fn cmd_list<S: ProjectStore>(store: &S) -> String {
    let projects = load_or_empty(store).await;
    if projects.is_empty() {
        return "No projects yet. Create one with `pitchperfect new`.".to_string();
    }

    projects
        .iter()
        .map(|project| {
            format!(
                "{}  {}  {}  {} words  {} runs",
                project.id,
                project.name,
                project.duration,
                project.word_count,
                project.runs.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn cmd_show<S: ProjectStore>(store: &S, id: &str) -> Result<String> {
    let projects = store.load().await?;
    let project = ops::find_project(&projects, id)?;
    Ok(format_project(project))
}

fn format_project(project: &Project) -> String {
    let mut out = vec![
        format!("{} ({})", project.name, project.id),
        format!("Target: {}", project.duration),
        format!("Words: {}", project.word_count),
        format!(
            "Script: {}",
            project.script_name.as_deref().unwrap_or("none")
        ),
    ];

    if project.runs.is_empty() {
        out.push("No runs yet".to_string());
    } else {
        out.push("Runs:".to_string());
        for run in &project.runs {
            out.push(format!(
                "  {}  {}  {}  {}  {}",
                run.id,
                run.name,
                local_date(run.date),
                run.duration_label(),
                run.mode.as_str()
            ));
        }
    }
    out.join("\n")
}

fn local_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

pub async fn cmd_new<S: ProjectStore>(
    store: &S,
    args: NewArgs,
    now: DateTime<Utc>,
) -> Result<String> {
    let script = match args.script {
        Some(path) => Some(estimator::estimate(Some(&path))?),
        None => None,
    };

    let project = modify(store, |projects| {
        let name = args
            .name
            .unwrap_or_else(|| ops::default_project_name(projects));
        let draft = ProjectDraft {
            name,
            duration: Duration::from_input(&args.minutes, &args.seconds),
            word_count: args.words,
            script,
        };
        Ok(ops::create_project(projects, draft, now)?)
    })
    .await?;

    Ok(format!("Created {} ({})", project.name, project.id))
}

pub async fn cmd_duration<S: ProjectStore>(store: &S, args: DurationArgs) -> Result<String> {
    let duration = Duration::from_input(&args.minutes, &args.seconds);
    let updated = modify(store, |projects| {
        let project = ops::find_project_mut(projects, &args.id)?;
        ops::update_duration(project, duration)?;
        Ok(project.duration)
    })
    .await?;
    Ok(format!("Duration set to {updated}"))
}

pub async fn cmd_words<S: ProjectStore>(store: &S, args: WordsArgs) -> Result<String> {
    modify(store, |projects| {
        let project = ops::find_project_mut(projects, &args.id)?;
        Ok(ops::set_word_count(project, args.count)?)
    })
    .await?;
    Ok(format!("Word count set to {}", args.count))
}

pub async fn cmd_script<S: ProjectStore>(store: &S, args: ScriptArgs) -> Result<String> {
    let script = estimator::estimate(Some(&args.path))?;
    let summary = format!("Attached {} ({} words)", script.name, script.word_count);
    modify(store, |projects| {
        let project = ops::find_project_mut(projects, &args.id)?;
        ops::attach_script(project, script);
        Ok(())
    })
    .await?;
    Ok(summary)
}

pub async fn cmd_unscript<S: ProjectStore>(store: &S, id: &str) -> Result<String> {
    let word_count = modify(store, |projects| {
        let project = ops::find_project_mut(projects, id)?;
        ops::remove_script(project);
        Ok(project.word_count)
    })
    .await?;
    Ok(format!("Script removed, keeping {word_count} words"))
}

pub async fn cmd_run_action<S: ProjectStore>(
    store: &S,
    target: &RunRef,
    action: RunAction,
) -> Result<String> {
    let message = match &action {
        RunAction::Rename(name) => format!("Renamed run to {}", name.trim()),
        RunAction::Delete => "Run deleted".to_string(),
    };
    modify(store, |projects| {
        let project = ops::find_project_mut(projects, &target.project)?;
        Ok(ops::apply_run_action(project, &target.run, action)?)
    })
    .await?;
    Ok(message)
}

pub async fn cmd_rename_run<S: ProjectStore>(store: &S, args: RenameRunArgs) -> Result<String> {
    cmd_run_action(store, &args.target, RunAction::Rename(args.name)).await
}

pub async fn cmd_delete_run<S: ProjectStore>(store: &S, target: RunRef) -> Result<String> {
    cmd_run_action(store, &target, RunAction::Delete).await
}
