//! Actions that can be dispatched by the user.

use super::EbcContext;
use crate::{
    errors::{EbcError, EbcResult},
    refs::RefStore,
    records::RecordStore,
    settings::{SettingsDocument, SettingsStore},
    template::{validate_template, Validation},
};
use anyhow::{bail, Result};
use itertools::Itertools;

impl EbcContext {
    /// Validates `template` against the fields known to the project.
    pub async fn validate(&self, template: &str) -> EbcResult<Validation> {
        let fields = self.records.field_names(&self.project).await?;
        Ok(validate_template(template, fields.iter().map(String::as_str)))
    }

    /// Fails with [EbcError::InvalidTemplate] unless `template` is valid.
    pub async fn ensure_valid(&self, template: &str) -> EbcResult<()> {
        let validation = self.validate(template).await?;
        if validation.is_valid() {
            return Ok(());
        }
        Err(EbcError::InvalidTemplate {
            template: template.to_string(),
            messages: validation.messages().join(" "),
        })
    }

    /// Reads the settings document, applies `f` and writes it back.
    pub async fn update_settings<F>(&self, f: F) -> EbcResult<SettingsDocument>
    where
        F: FnOnce(&mut SettingsDocument),
    {
        let mut document = self.settings.get_settings(&self.project).await?;
        f(&mut document);
        self.settings.set_settings(document).await
    }

    /// Validates `template`, then stores it in the settings document through `f`.
    /// An invalid template leaves the stored document untouched.
    pub async fn save_template<F>(&self, template: String, f: F) -> EbcResult<SettingsDocument>
    where
        F: FnOnce(&mut SettingsDocument, String),
    {
        self.ensure_valid(&template).await?;
        self.update_settings(|d| f(d, template)).await
    }

    /// Prompts the user for the branch to cut new branches from. The default branch
    /// is listed first.
    pub async fn select_source_branch(&self, repository_id: &str) -> Result<String> {
        let branches = self
            .refs
            .list_branches(repository_id, &self.project)
            .await?
            .into_iter()
            .sorted_by_key(|b| !b.is_default)
            .map(|b| b.name)
            .collect_vec();

        if branches.is_empty() {
            bail!("Repository `{}` has no branches.", repository_id);
        }

        Ok(inquire::Select::new("Select the source branch:", branches).prompt()?)
    }
}
