//! The [RefStore] interface over a repository's ref namespace.

use crate::{constants::HEADS_PREFIX, errors::EbcResult};
use async_trait::async_trait;

/// Descriptor of a repository known to the ref store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct RepositoryInfo {
    pub(crate) id: String,
    pub(crate) name: String,
}

/// A named ref and the object it points to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct RefEntry {
    /// Full ref name, e.g. `refs/heads/main`.
    pub(crate) name: String,
    pub(crate) object_id: String,
}

/// A branch together with its head commit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct BranchEntry {
    /// Short branch name, e.g. `main`.
    pub(crate) name: String,
    pub(crate) commit_id: String,
    pub(crate) is_default: bool,
}

/// A request to move `name` from `old_object_id` to `new_object_id`.
///
/// An all-zero `old_object_id` requests creation of a ref that must not exist yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct RefUpdate {
    pub(crate) name: String,
    pub(crate) new_object_id: String,
    pub(crate) old_object_id: String,
}

/// Outcome of a [RefUpdate].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum RefUpdateStatus {
    Succeeded,
    /// The ref's current value did not match `old_object_id`.
    Conflict,
}

/// Storage of named refs for one or more repositories.
#[async_trait]
pub(crate) trait RefStore: Send + Sync {
    /// Looks up a repository descriptor.
    ///
    /// Fails with [EbcError::RepositoryNotFound] if the repository is unknown.
    ///
    /// [EbcError::RepositoryNotFound]: crate::errors::EbcError::RepositoryNotFound
    async fn repository(&self, repository_id: &str, project: &str) -> EbcResult<RepositoryInfo>;

    /// Lists refs whose full name starts with `prefix`.
    async fn list_refs(
        &self,
        repository_id: &str,
        project: &str,
        prefix: &str,
    ) -> EbcResult<Vec<RefEntry>>;

    /// Lists the repository's branches.
    async fn list_branches(&self, repository_id: &str, project: &str)
        -> EbcResult<Vec<BranchEntry>>;

    /// Applies a single ref update, honoring its expected old value.
    async fn update_ref(&self, repository_id: &str, update: &RefUpdate)
        -> EbcResult<RefUpdateStatus>;
}

/// Returns the full ref name of the branch `branch_name`.
pub(crate) fn branch_ref_name(branch_name: &str) -> String {
    format!("{}{}", HEADS_PREFIX, branch_name)
}
