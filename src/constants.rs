//! Constants for the `ebc` application.

use nu_ansi_term::Color;

/// Directory inside the git dir that holds `ebc` state.
pub(crate) const EBC_DIR: &str = "ebc";
pub(crate) const RECORDS_FILE_NAME: &str = "records.toml";

/// Collection that holds one settings document per project.
pub(crate) const SETTINGS_COLLECTION: &str = "ProjectSettings";

pub(crate) const DEFAULT_BRANCH_NAME_TEMPLATE: &str = "feature/${System.Id}-${System.Title}";
pub(crate) const DEFAULT_REPLACEMENT: &str = "_";
pub(crate) const REPLACEMENT_OPTIONS: [&str; 2] = ["_", "-"];

pub(crate) const SOURCE_BRANCH_NAME: &str = "SourceBranchName";
pub(crate) const SOURCE_BRANCH_NAME_WITH_REPLACEMENT: &str = "SourceBranchNameWithReplacement";
pub(crate) const SOURCE_BRANCH_NAME_TAIL: &str = "SourceBranchNameTail";
pub(crate) const PSEUDO_FIELDS: [&str; 3] = [
    SOURCE_BRANCH_NAME,
    SOURCE_BRANCH_NAME_WITH_REPLACEMENT,
    SOURCE_BRANCH_NAME_TAIL,
];

pub(crate) const ID_FIELD: &str = "System.Id";
pub(crate) const TYPE_FIELD: &str = "System.WorkItemType";
pub(crate) const STATE_FIELD: &str = "System.State";
pub(crate) const SYSTEM_FIELDS: [&str; 8] = [
    ID_FIELD,
    "System.Title",
    TYPE_FIELD,
    STATE_FIELD,
    "System.AreaPath",
    "System.IterationPath",
    "System.AssignedTo",
    "System.TeamProject",
];

pub(crate) const HEADS_PREFIX: &str = "refs/heads/";

/// The all-zero object id. As an old value it means "the ref must not exist yet".
pub(crate) const ZERO_OID: &str = "0000000000000000000000000000000000000000";

pub(crate) const ARTIFACT_LINK_REL: &str = "ArtifactLink";
pub(crate) const BRANCH_LINK_NAME: &str = "Branch";

pub(crate) const OK_COLOR: Color = Color::Green;
pub(crate) const WARN_COLOR: Color = Color::Yellow;
pub(crate) const ERR_COLOR: Color = Color::Red;
pub(crate) const NAME_COLOR: Color = Color::Blue;
