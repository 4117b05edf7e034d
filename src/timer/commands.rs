//! Terminal timer screen.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::models::Run;
use crate::projects::ProjectStore;

use super::{
    LaunchParams, TimerAction, TimerColor, TimerConfig, TimerController, TimerMode, TimerSnapshot,
    TimerStatus,
};

const RED: &str = "\x1b[31m";
const AMBER: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const LIGHT_NEUTRAL: &str = "\x1b[30m";
const DARK_NEUTRAL: &str = "\x1b[97m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// One keystroke on the timer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    /// Start, pause or resume.
    Primary,
    Lap,
    Reset,
    ToggleMode,
    SaveAndExit,
    Discard,
}

impl ScreenCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "space" => Some(ScreenCommand::Primary),
            "l" => Some(ScreenCommand::Lap),
            "r" => Some(ScreenCommand::Reset),
            "m" => Some(ScreenCommand::ToggleMode),
            "q" => Some(ScreenCommand::SaveAndExit),
            "x" => Some(ScreenCommand::Discard),
            _ => None,
        }
    }
}

/// Runs the timer screen until the user leaves it. Returns the recorded run,
/// if the session belonged to a project and the save went through.
pub async fn run_timer<S>(
    params: LaunchParams,
    store: Arc<S>,
    config: TimerConfig,
    dark_mode: bool,
) -> Result<Option<Run>>
where
    S: ProjectStore + 'static,
{
    let timer = TimerController::new(params, config);
    println!("{}", help_line(timer.params()));

    let cancel = CancellationToken::new();
    let renderer = tokio::spawn(render_loop(timer.subscribe(), cancel.clone(), dark_mode));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let outcome = loop {
        let line = lines
            .next_line()
            .await
            .context("failed to read timer input")?;

        let Some(line) = line else {
            // Input closed: leave the screen the same way the exit button does.
            break ScreenCommand::SaveAndExit;
        };

        let Some(command) = ScreenCommand::parse(&line) else {
            println!("{}", help_line(timer.params()));
            continue;
        };

        match command {
            ScreenCommand::Primary => {
                let _ = timer.primary_action().await;
            }
            ScreenCommand::Lap => {
                if let Ok(lap) = timer.lap().await {
                    println!("\nLap {}  {}", lap.index, lap.split_time);
                }
            }
            ScreenCommand::Reset => {
                let _ = timer.reset().await;
            }
            ScreenCommand::ToggleMode => {
                let _ = timer.toggle_mode().await;
            }
            ScreenCommand::SaveAndExit | ScreenCommand::Discard => break command,
        }
    };

    let run = match outcome {
        ScreenCommand::Discard => {
            let session = timer.teardown().await;
            warn!("Timer discarded after {}s", session.time_used());
            None
        }
        _ => {
            let pending = timer.save_and_exit(store).await;
            // The screen is gone already; only the process lifetime waits for the save.
            pending.await.unwrap_or_else(|err| {
                warn!("Run save task failed: {err}");
                None
            })
        }
    };

    cancel.cancel();
    let _ = renderer.await;
    println!();
    Ok(run)
}

async fn render_loop(
    mut updates: watch::Receiver<TimerSnapshot>,
    cancel: CancellationToken,
    dark_mode: bool,
) {
    loop {
        let line = render_line(&updates.borrow_and_update(), dark_mode);
        print!("\r\x1b[2K{line}");
        let _ = std::io::stdout().flush();

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

fn help_line(params: &LaunchParams) -> String {
    let exit = if params.is_quick_start {
        "q exit"
    } else {
        "q save & exit"
    };
    format!(
        "[enter/s] start/pause/resume  [l] lap  [r] reset  [m] toggle mode  [{exit}]  [x] discard"
    )
}

/// Single status line for the current snapshot.
pub fn render_line(snapshot: &TimerSnapshot, dark_mode: bool) -> String {
    let color = match snapshot.color {
        TimerColor::Red => RED,
        TimerColor::Amber => AMBER,
        TimerColor::Green => GREEN,
        TimerColor::Neutral if dark_mode => DARK_NEUTRAL,
        TimerColor::Neutral => LIGHT_NEUTRAL,
    };
    let dim = if snapshot.dimmed { DIM } else { "" };
    let mode = match snapshot.mode {
        TimerMode::Countdown => "Countdown",
        TimerMode::Stopwatch => "Stopwatch",
    };
    let next = match snapshot.status {
        TimerStatus::Running => TimerAction::Pause,
        TimerStatus::Paused => TimerAction::Resume,
        _ => TimerAction::Start,
    };

    let mut line = format!("{dim}{color}{}{RESET}  {mode}  [{next:?}]", snapshot.display);
    if !snapshot.laps.is_empty() {
        let laps: Vec<String> = snapshot
            .laps
            .iter()
            .map(|lap| format!("#{} {}", lap.index, lap.split_time))
            .collect();
        line.push_str("  Laps: ");
        line.push_str(&laps.join(" | "));
    }
    line
}
