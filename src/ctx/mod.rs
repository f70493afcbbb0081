//! The in-memory context of the `ebc` application.

use crate::{
    constants::{EBC_DIR, RECORDS_FILE_NAME},
    creator::BranchCreator,
    git::{active_repository, repository_name, GitRefStore},
    notify::Notifier,
    records::TomlRecordStore,
    settings::FileSettingsStore,
};
use anyhow::{anyhow, Result};
use git2::Repository;
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

mod actions;

mod fmt;
pub(crate) use fmt::write_validation;

/// Returns the directory holding `ebc` state for the repository whose git dir is `git_dir`.
pub fn ebc_dir(git_dir: &std::path::Path) -> PathBuf {
    git_dir.join(EBC_DIR)
}

/// The in-memory context of the `ebc` application.
pub struct EbcContext {
    /// The project that settings and records belong to.
    pub project: String,
    /// Name of the active repository, which doubles as its id.
    pub repository_name: String,
    pub refs: Arc<GitRefStore>,
    pub records: Arc<TomlRecordStore>,
    pub settings: Arc<FileSettingsStore>,
}

impl EbcContext {
    /// Loads the context for the repository containing the current working directory.
    ///
    /// ## Takes
    /// - `project` - The project name. Defaults to the repository name.
    /// - `records` - Path of the records file. Defaults to `<git dir>/ebc/records.toml`.
    pub fn load(project: Option<String>, records: Option<PathBuf>) -> Result<Self> {
        let repository = active_repository().ok_or_else(|| anyhow!("Not in a git repository."))?;
        Ok(Self::open(repository, project, records))
    }

    /// Builds the context over `repository`, keeping `ebc` state inside its git dir.
    pub fn open(repository: Repository, project: Option<String>, records: Option<PathBuf>) -> Self {
        let state_dir = ebc_dir(repository.path());
        let repository_name = repository_name(&repository);
        let project = project.unwrap_or_else(|| repository_name.clone());
        let records = records.unwrap_or_else(|| state_dir.join(RECORDS_FILE_NAME));

        debug!(
            project = %project,
            repository = %repository_name,
            records = %records.display(),
            "Loaded context"
        );

        Self {
            project,
            repository_name,
            refs: Arc::new(GitRefStore::new(repository)),
            records: Arc::new(TomlRecordStore::new(records)),
            settings: Arc::new(FileSettingsStore::new(state_dir)),
        }
    }

    /// Assembles a [BranchCreator] over the context's stores.
    pub fn creator(&self, notifier: Arc<dyn Notifier>) -> BranchCreator {
        BranchCreator::new(
            self.refs.clone(),
            self.records.clone(),
            self.settings.clone(),
            notifier,
        )
    }
}
