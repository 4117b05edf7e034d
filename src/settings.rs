use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default = "default_dark_mode")]
    dark_mode: bool,
}

fn default_dark_mode() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dark_mode: default_dark_mode(),
        }
    }
}

/// Theme preference, persisted as `settings.json` in the data directory.
/// Dark until the user says otherwise.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn is_dark_mode(&self) -> bool {
        self.data.read().unwrap().dark_mode
    }

    pub fn set_dark_mode(&self, dark_mode: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.dark_mode = dark_mode;
        self.persist(&guard)
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_dark_mode(&self) -> Result<bool> {
        let mut guard = self.data.write().unwrap();
        guard.dark_mode = !guard.dark_mode;
        self.persist(&guard)?;
        Ok(guard.dark_mode)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
