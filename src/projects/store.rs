use std::future::Future;

use anyhow::{Context, Result};
use log::{error, warn};

use crate::db::Database;
use crate::models::Project;

/// Key the whole project collection is stored under.
pub const PROJECTS_KEY: &str = "projects";

/// Whole-collection persistence for projects. There is no per-record
/// update: callers load everything, change it and save everything back.
pub trait ProjectStore: Send + Sync {
    /// Stored projects; empty when nothing was ever saved or the stored
    /// document cannot be parsed. Errors only when the store itself fails.
    fn load(&self) -> impl Future<Output = Result<Vec<Project>>> + Send;

    fn save_all(&self, projects: Vec<Project>) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone)]
pub struct KvProjectStore {
    db: Database,
}

impl KvProjectStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ProjectStore for KvProjectStore {
    async fn load(&self) -> Result<Vec<Project>> {
        let Some(raw) = self.db.get_value(PROJECTS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(projects) => Ok(projects),
            Err(err) => {
                warn!("Stored project collection is unreadable, treating as empty: {err}");
                Ok(Vec::new())
            }
        }
    }

    async fn save_all(&self, projects: Vec<Project>) -> Result<()> {
        let serialized =
            serde_json::to_string(&projects).context("failed to serialize projects")?;
        self.db.set_value(PROJECTS_KEY, serialized).await
    }
}

/// Load for display: a failing store shows as an empty list.
pub async fn load_or_empty<S: ProjectStore>(store: &S) -> Vec<Project> {
    match store.load().await {
        Ok(projects) => projects,
        Err(err) => {
            error!("Error loading projects: {err:#}");
            Vec::new()
        }
    }
}

/// Read-modify-write of the full collection. Nothing is written when `change` fails.
pub async fn modify<S, F, T>(store: &S, change: F) -> Result<T>
where
    S: ProjectStore,
    F: FnOnce(&mut Vec<Project>) -> Result<T>,
{
    let mut projects = store.load().await.context("failed to load projects")?;
    let outcome = change(&mut projects)?;
    store
        .save_all(projects)
        .await
        .context("failed to save projects")?;
    Ok(outcome)
}
