//! A [SettingsStore] keeping one TOML document per project on disk.

use super::{SettingsDocument, SettingsStore};
use crate::{
    constants::SETTINGS_COLLECTION,
    errors::{EbcError, EbcResult},
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info};
use url::form_urlencoded::byte_serialize;

/// Settings documents stored as `<root>/ProjectSettings/<project id>.toml`.
#[derive(Debug)]
pub(crate) struct FileSettingsStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileSettingsStore {
    pub(crate) fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// The id is percent-encoded so that every project maps to one file directly
    /// inside the collection.
    fn document_path(&self, project_id: &str) -> PathBuf {
        let file_name: String = byte_serialize(project_id.as_bytes()).collect();
        self.root
            .join(SETTINGS_COLLECTION)
            .join(format!("{}.toml", file_name))
    }

    fn read(&self, project_id: &str) -> EbcResult<Option<SettingsDocument>> {
        let path = self.document_path(project_id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&std::fs::read_to_string(path)?)?))
    }

    /// Writes `document` if its etag matches the stored one. The lock must be held.
    fn write_guarded(&self, mut document: SettingsDocument) -> EbcResult<SettingsDocument> {
        let stored_etag = self.read(&document.id)?.and_then(|d| d.etag);
        if stored_etag != document.etag {
            return Err(EbcError::EtagMismatch(document.id));
        }

        let next = stored_etag
            .and_then(|etag| etag.parse::<u64>().ok())
            .map_or(1, |version| version + 1);
        document.etag = Some(next.to_string());

        let path = self.document_path(&document.id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(&document)?)?;
        debug!(path = %path.display(), etag = next, "Wrote settings document");

        Ok(document)
    }

    fn locked(&self) -> EbcResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| EbcError::Store(format!("Settings store lock poisoned: {e}")))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_settings(&self, project_id: &str) -> EbcResult<SettingsDocument> {
        let _guard = self.locked()?;
        match self.read(project_id)? {
            Some(document) => Ok(document),
            None => {
                info!(project = project_id, "Creating default settings document");
                self.write_guarded(SettingsDocument::for_project(project_id))
            }
        }
    }

    async fn set_settings(&self, document: SettingsDocument) -> EbcResult<SettingsDocument> {
        let _guard = self.locked()?;
        self.write_guarded(document)
    }
}
