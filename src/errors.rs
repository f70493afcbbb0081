//! Error types for the `ebc` application.

use thiserror::Error;

/// Errors raised by the core of `ebc`.
#[derive(Debug, Error)]
pub enum EbcError {
    /// The repository could not be found in the ref store.
    #[error("Repository `{0}` not found.")]
    RepositoryNotFound(String),
    /// The source branch is not among the repository's branches.
    #[error("Source branch `{0}` not found.")]
    SourceBranchNotFound(String),
    /// The record could not be found in the record store.
    #[error("Record {0} not found.")]
    RecordNotFound(u64),
    /// Linking the new branch to its record failed.
    #[error("Failed to link branch `{branch}` to record {record_id}: {source}")]
    LinkFailed {
        record_id: u64,
        branch: String,
        #[source]
        source: Box<EbcError>,
    },
    /// Transitioning the state of a record failed.
    #[error("Failed to set state of record {record_id} to `{state}`: {source}")]
    StateUpdateFailed {
        record_id: u64,
        state: String,
        #[source]
        source: Box<EbcError>,
    },
    /// The settings document changed since it was read.
    #[error("Settings for project `{0}` were modified concurrently. Reload and try again.")]
    EtagMismatch(String),
    /// A template failed validation.
    #[error("Invalid template `{template}`: {messages}")]
    InvalidTemplate { template: String, messages: String },
    /// The repository base URL cannot carry a path.
    #[error("Base URL `{0}` cannot hold a repository path.")]
    InvalidBaseUrl(String),
    /// A backing store failed outside of the cases above.
    #[error("{0}")]
    Store(String),
    #[error(transparent)]
    Git(#[from] git2::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

/// Result alias for [EbcError].
pub type EbcResult<T> = Result<T, EbcError>;
