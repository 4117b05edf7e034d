pub mod commands;
pub mod config;
pub mod controller;
pub mod launch;
pub mod recorder;
pub mod state;

pub use config::TimerConfig;
pub use controller::TimerController;
pub use launch::{LaunchError, LaunchParams, QuickStartChoice, QUICK_START_PRESETS};
pub use state::{
    Lap, TimerAction, TimerColor, TimerError, TimerMode, TimerSession, TimerSnapshot, TimerStatus,
};
