//! Per-project settings controlling branch name resolution.

use crate::{
    constants::{DEFAULT_BRANCH_NAME_TEMPLATE, DEFAULT_REPLACEMENT},
    errors::EbcResult,
    template::Sanitization,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod file;
pub(crate) use file::FileSettingsStore;

/// A value that only applies while `active` is set.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct Toggle<T> {
    pub(crate) active: bool,
    pub(crate) value: T,
}

impl<T> Toggle<T> {
    pub(crate) fn new(active: bool, value: T) -> Self {
        Self { active, value }
    }

    /// Returns the value if the toggle is active.
    pub(crate) fn active_value(&self) -> Option<&T> {
        self.active.then_some(&self.value)
    }
}

/// The persisted settings document of a project.
///
/// Keys missing from a stored document take their default values.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct SettingsDocument {
    /// Opaque version stamp of the stored document. [None] until first written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) etag: Option<String>,
    /// The project the document belongs to.
    pub(crate) id: String,
    pub(crate) default_branch_name_template: String,
    pub(crate) non_alphanumeric_characters_replacement: String,
    pub(crate) lowercase_branch_name: bool,
    pub(crate) update_record_state: bool,
    /// Template overrides, keyed by record type.
    pub(crate) branch_name_templates: BTreeMap<String, Toggle<String>>,
    /// Target state after branch creation, keyed by record type.
    pub(crate) record_states: BTreeMap<String, Toggle<String>>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            etag: None,
            id: String::new(),
            default_branch_name_template: DEFAULT_BRANCH_NAME_TEMPLATE.to_string(),
            non_alphanumeric_characters_replacement: DEFAULT_REPLACEMENT.to_string(),
            lowercase_branch_name: false,
            update_record_state: false,
            branch_name_templates: BTreeMap::new(),
            record_states: BTreeMap::new(),
        }
    }
}

impl SettingsDocument {
    /// Creates a default document for `project_id`.
    pub(crate) fn for_project(project_id: &str) -> Self {
        Self {
            id: project_id.to_string(),
            ..Default::default()
        }
    }

    /// The template for `record_type`: its active override, or the default template.
    pub(crate) fn template_for(&self, record_type: &str) -> &str {
        self.branch_name_templates
            .get(record_type)
            .and_then(Toggle::active_value)
            .map_or(self.default_branch_name_template.as_str(), String::as_str)
    }

    /// The state to move a `record_type` record into after its branch is created, if any.
    pub(crate) fn target_state_for(&self, record_type: &str) -> Option<&str> {
        if !self.update_record_state {
            return None;
        }
        self.record_states
            .get(record_type)
            .and_then(Toggle::active_value)
            .map(String::as_str)
            .filter(|state| !state.is_empty())
    }

    pub(crate) fn sanitization(&self) -> Sanitization<'_> {
        Sanitization {
            replacement: &self.non_alphanumeric_characters_replacement,
            lowercase: self.lowercase_branch_name,
        }
    }
}

/// Storage of [SettingsDocument]s, one per project.
#[async_trait]
pub(crate) trait SettingsStore: Send + Sync {
    /// Reads the settings of `project_id`, creating a default document on first access.
    async fn get_settings(&self, project_id: &str) -> EbcResult<SettingsDocument>;

    /// Writes `document`, returning it with its new version stamp.
    ///
    /// Fails with [EbcError::EtagMismatch] if the stored document changed since `document`
    /// was read.
    ///
    /// [EbcError::EtagMismatch]: crate::errors::EbcError::EtagMismatch
    async fn set_settings(&self, document: SettingsDocument) -> EbcResult<SettingsDocument>;
}
