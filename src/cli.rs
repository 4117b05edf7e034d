use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::timer::TimerMode;

#[derive(Parser)]
#[command(
    name = "pitchperfect",
    about = "Practice presentations against a target duration",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the project database and settings
    #[arg(long, global = true, env = "PITCHPERFECT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects (the default)
    List,
    /// Create a project
    New(NewArgs),
    /// Show a project and its run history
    Show(ProjectArg),
    /// Change a project's target duration
    Duration(DurationArgs),
    /// Set a project's word count manually
    Words(WordsArgs),
    /// Attach a script and take the word count from it
    Script(ScriptArgs),
    /// Detach the script, keeping the word count
    Unscript(ProjectArg),
    /// Rename a recorded run
    RenameRun(RenameRunArgs),
    /// Delete a recorded run
    DeleteRun(RunRef),
    /// Practice a project; the run is saved on exit
    Run(RunArgs),
    /// Start an unsaved timer
    Quick(QuickArgs),
    /// Show or change the theme
    Theme(ThemeArgs),
}

#[derive(Args)]
pub struct ProjectArg {
    /// Project id
    pub id: String,
}

#[derive(Args)]
pub struct NewArgs {
    /// Project name (defaults to the first free "Untitled" name)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "")]
    pub minutes: String,

    #[arg(long, default_value = "")]
    pub seconds: String,

    /// Word count, when no script is attached
    #[arg(long)]
    pub words: Option<u32>,

    /// Script document to estimate the word count from
    #[arg(long)]
    pub script: Option<PathBuf>,
}

#[derive(Args)]
pub struct DurationArgs {
    pub id: String,

    #[arg(long, default_value = "")]
    pub minutes: String,

    #[arg(long, default_value = "")]
    pub seconds: String,
}

#[derive(Args)]
pub struct WordsArgs {
    pub id: String,
    pub count: u32,
}

#[derive(Args)]
pub struct ScriptArgs {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Args, Clone)]
pub struct RunRef {
    /// Project id
    pub project: String,
    /// Run id
    pub run: String,
}

#[derive(Args)]
pub struct RenameRunArgs {
    #[command(flatten)]
    pub target: RunRef,
    pub name: String,
}

#[derive(Args)]
pub struct RunArgs {
    pub id: String,

    #[arg(long, value_enum, default_value_t = ModeArg::Countdown)]
    pub mode: ModeArg,
}

#[derive(Args)]
pub struct QuickArgs {
    /// Preset length in minutes: 1, 3, 5, 10, 15 or 30
    #[arg(long, conflicts_with_all = ["minutes", "seconds"])]
    pub preset: Option<u32>,

    #[arg(long)]
    pub minutes: Option<String>,

    #[arg(long)]
    pub seconds: Option<String>,

    #[arg(long, value_enum, default_value_t = ModeArg::Countdown)]
    pub mode: ModeArg,
}

#[derive(Args)]
pub struct ThemeArgs {
    #[arg(value_enum)]
    pub choice: Option<ThemeChoice>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Countdown,
    Stopwatch,
}

impl From<ModeArg> for TimerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Countdown => TimerMode::Countdown,
            ModeArg::Stopwatch => TimerMode::Stopwatch,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}
