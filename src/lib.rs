pub mod cli;
pub mod db;
pub mod estimator;
pub mod models;
pub mod projects;
pub mod settings;
pub mod timer;
pub mod utils;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use log::info;

use cli::{Cli, Commands, QuickArgs, ThemeChoice};
use db::Database;
use models::Duration;
use projects::{commands as project_cmds, ops, KvProjectStore, ProjectStore};
use settings::SettingsStore;
use timer::{commands::run_timer, LaunchParams, QuickStartChoice, TimerConfig};

const DB_FILE: &str = "pitchperfect.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

pub struct AppState {
    pub projects: Arc<KvProjectStore>,
    pub settings: SettingsStore,
    pub timer_config: TimerConfig,
}

impl AppState {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join(DB_FILE))?;
        info!("Opened project store at {}", database.path().display());
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

        Ok(Self {
            projects: Arc::new(KvProjectStore::new(database)),
            settings,
            timer_config: TimerConfig::from_env(),
        })
    }
}

/// `--data-dir` / `PITCHPERFECT_DATA_DIR`, else the platform data directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => dirs_next::data_dir()
            .map(|dir| dir.join("pitchperfect"))
            .ok_or_else(|| anyhow!("no data directory available; pass --data-dir")),
    }
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;
    let state = AppState::open(&data_dir)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let output = runtime.block_on(dispatch(&state, cli.command.unwrap_or(Commands::List)))?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

pub async fn dispatch(state: &AppState, command: Commands) -> Result<String> {
    let store = state.projects.as_ref();
    match command {
        Commands::List => Ok(project_cmds::cmd_list(store).await),
        Commands::New(args) => project_cmds::cmd_new(store, args, Utc::now()).await,
        Commands::Show(args) => project_cmds::cmd_show(store, &args.id).await,
        Commands::Duration(args) => project_cmds::cmd_duration(store, args).await,
        Commands::Words(args) => project_cmds::cmd_words(store, args).await,
        Commands::Script(args) => project_cmds::cmd_script(store, args).await,
        Commands::Unscript(args) => project_cmds::cmd_unscript(store, &args.id).await,
        Commands::RenameRun(args) => project_cmds::cmd_rename_run(store, args).await,
        Commands::DeleteRun(args) => project_cmds::cmd_delete_run(store, args).await,
        Commands::Run(args) => {
            let projects = store.load().await?;
            let project = ops::find_project(&projects, &args.id)?;
            let params = LaunchParams::for_project(project, args.mode.into());
            practice(state, params).await
        }
        Commands::Quick(args) => practice(state, quick_params(args)?).await,
        Commands::Theme(args) => theme(&state.settings, args.choice),
    }
}

async fn practice(state: &AppState, params: LaunchParams) -> Result<String> {
    let dark_mode = state.settings.is_dark_mode();
    let run = run_timer(
        params,
        Arc::clone(&state.projects),
        state.timer_config,
        dark_mode,
    )
    .await?;

    Ok(match run {
        Some(run) => format!("Saved {} ({})", run.name, run.duration_label()),
        None => String::new(),
    })
}

/// Quick-start launch from flags. Presets are given in minutes.
pub fn quick_params(args: QuickArgs) -> Result<LaunchParams> {
    let choice = match (args.preset, args.minutes, args.seconds) {
        (Some(minutes), _, _) => Some(QuickStartChoice::Preset(minutes.saturating_mul(60))),
        (None, None, None) => None,
        (None, minutes, seconds) => Some(QuickStartChoice::Custom(Duration::from_input(
            minutes.as_deref().unwrap_or(""),
            seconds.as_deref().unwrap_or(""),
        ))),
    };
    Ok(LaunchParams::quick_start(choice, args.mode.into())?)
}

fn theme(settings: &SettingsStore, choice: Option<ThemeChoice>) -> Result<String> {
    let dark_mode = match choice {
        None => settings.is_dark_mode(),
        Some(ThemeChoice::Dark) => {
            settings.set_dark_mode(true)?;
            true
        }
        Some(ThemeChoice::Light) => {
            settings.set_dark_mode(false)?;
            false
        }
        Some(ThemeChoice::Toggle) => settings.toggle_dark_mode()?,
    };
    Ok(format!("Theme: {}", if dark_mode { "dark" } else { "light" }))
}
