//! Utilities for interacting with `git` repositories for the `ebc` application.

use crate::{
    constants::ZERO_OID,
    errors::{EbcError, EbcResult},
    refs::{BranchEntry, RefEntry, RefStore, RefUpdate, RefUpdateStatus, RepositoryInfo},
};
use async_trait::async_trait;
use git2::{BranchType, ErrorCode, Oid, Repository};
use std::{
    env,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}

/// Returns the display name of a repository: its working directory's name, or the
/// git dir's name for bare repositories.
pub fn repository_name(repository: &Repository) -> String {
    let dir = repository.workdir().unwrap_or_else(|| repository.path());
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// A [RefStore] over a single local [Repository]. The repository's id is its name.
pub struct GitRefStore {
    repository: Mutex<Repository>,
    name: String,
}

impl GitRefStore {
    /// Wraps `repository`.
    pub fn new(repository: Repository) -> Self {
        let name = repository_name(&repository);
        Self {
            repository: Mutex::new(repository),
            name,
        }
    }

    /// Locks the repository, provided `repository_id` names it.
    fn open(&self, repository_id: &str) -> EbcResult<MutexGuard<'_, Repository>> {
        if repository_id != self.name {
            return Err(EbcError::RepositoryNotFound(repository_id.to_string()));
        }
        self.repository
            .lock()
            .map_err(|e| EbcError::Store(format!("Repository lock poisoned: {e}")))
    }
}

#[async_trait]
impl RefStore for GitRefStore {
    async fn repository(&self, repository_id: &str, _project: &str) -> EbcResult<RepositoryInfo> {
        self.open(repository_id)?;
        Ok(RepositoryInfo {
            id: self.name.clone(),
            name: self.name.clone(),
        })
    }

    async fn list_refs(
        &self,
        repository_id: &str,
        _project: &str,
        prefix: &str,
    ) -> EbcResult<Vec<RefEntry>> {
        let repository = self.open(repository_id)?;
        let mut refs = Vec::new();
        for reference in repository.references()? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }
            if let Some(oid) = reference.resolve()?.target() {
                refs.push(RefEntry {
                    name: name.to_string(),
                    object_id: oid.to_string(),
                });
            }
        }
        Ok(refs)
    }

    async fn list_branches(
        &self,
        repository_id: &str,
        _project: &str,
    ) -> EbcResult<Vec<BranchEntry>> {
        let repository = self.open(repository_id)?;
        let branches = repository
            .branches(Some(BranchType::Local))?
            .map(|b| -> EbcResult<BranchEntry> {
                let (branch, _) = b?;
                let name = branch
                    .name()?
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| EbcError::Store("Branch name is not valid UTF-8.".into()))?;
                Ok(BranchEntry {
                    name,
                    commit_id: branch.get().peel_to_commit()?.id().to_string(),
                    is_default: branch.is_head(),
                })
            })
            .collect::<EbcResult<Vec<_>>>();
        branches
    }

    async fn update_ref(
        &self,
        repository_id: &str,
        update: &RefUpdate,
    ) -> EbcResult<RefUpdateStatus> {
        let repository = self.open(repository_id)?;
        let new_oid = Oid::from_str(&update.new_object_id)?;
        let log_message = format!("ebc: create {}", update.name);

        let result = if update.old_object_id == ZERO_OID {
            repository.reference(&update.name, new_oid, false, &log_message)
        } else {
            let old_oid = Oid::from_str(&update.old_object_id)?;
            repository.reference_matching(&update.name, new_oid, true, old_oid, &log_message)
        };

        match result {
            Ok(_) => Ok(RefUpdateStatus::Succeeded),
            Err(e) if matches!(e.code(), ErrorCode::Exists | ErrorCode::Modified) => {
                debug!(name = %update.name, error = %e, "Ref update rejected");
                Ok(RefUpdateStatus::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::GitRefStore;
    use crate::{
        constants::ZERO_OID,
        refs::{RefStore, RefUpdate, RefUpdateStatus},
    };
    use git2::{Repository, Signature};

    /// Creates a repository with one commit on `main`, returning its store and commit id.
    fn fixture() -> (tempfile::TempDir, GitRefStore, String, String) {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::init(dir.path()).unwrap();
        let commit_id = {
            let signature = Signature::now("ebc", "ebc@example.com").unwrap();
            let tree_id = repository.index().unwrap().write_tree().unwrap();
            let tree = repository.find_tree(tree_id).unwrap();
            let oid = repository
                .commit(None, &signature, &signature, "init", &tree, &[])
                .unwrap();
            repository.reference("refs/heads/main", oid, true, "init").unwrap();
            repository.set_head("refs/heads/main").unwrap();
            oid.to_string()
        };
        let store = GitRefStore::new(repository);
        let name = store.name.clone();
        (dir, store, name, commit_id)
    }

    fn create(name: &str, commit_id: &str) -> RefUpdate {
        RefUpdate {
            name: name.to_string(),
            new_object_id: commit_id.to_string(),
            old_object_id: ZERO_OID.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_branches_with_default() {
        let (_dir, store, repo, commit_id) = fixture();
        let branches = store.list_branches(&repo, "proj").await.unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "main");
        assert_eq!(branches[0].commit_id, commit_id);
        assert!(branches[0].is_default);
    }

    #[tokio::test]
    async fn optimistic_create_rejects_existing_ref() {
        let (_dir, store, repo, commit_id) = fixture();
        let update = create("refs/heads/feature/42-fix", &commit_id);

        assert_eq!(
            store.update_ref(&repo, &update).await.unwrap(),
            RefUpdateStatus::Succeeded
        );
        assert_eq!(
            store.update_ref(&repo, &update).await.unwrap(),
            RefUpdateStatus::Conflict
        );

        let refs = store
            .list_refs(&repo, "proj", "refs/heads/feature/")
            .await
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "refs/heads/feature/42-fix");
        assert_eq!(refs[0].object_id, commit_id);
    }

    #[tokio::test]
    async fn unknown_repository_is_not_found() {
        let (_dir, store, _repo, _commit_id) = fixture();
        let err = store.repository("other", "proj").await.unwrap_err();
        assert!(matches!(err, crate::errors::EbcError::RepositoryNotFound(_)));
    }
}
