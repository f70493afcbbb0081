//! `config` subcommand.

use crate::{
    constants::{NAME_COLOR, OK_COLOR, REPLACEMENT_OPTIONS},
    ctx::EbcContext,
    settings::Toggle,
};
use anyhow::{bail, Result};
use clap::{ArgAction, Args, Subcommand};

/// CLI arguments for the `config` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ConfigCmd {
    #[clap(subcommand)]
    action: Option<ConfigAction>,
}

/// Edits of the settings document.
#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
enum ConfigAction {
    /// Print the current settings.
    Show,
    /// Set the default branch name template.
    Template {
        template: String,
    },
    /// Set or disable the template override of a record type.
    Override {
        record_type: String,
        template: Option<String>,
        /// Disable the override, keeping its template for later.
        #[clap(long, conflicts_with = "template")]
        disable: bool,
    },
    /// Set the replacement for non-alphanumeric characters.
    Replacement {
        #[arg(value_parser = REPLACEMENT_OPTIONS)]
        replacement: String,
    },
    /// Enable or disable lowercasing of branch names.
    Lowercase {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Enable or disable record state updates after branch creation.
    UpdateState {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Set or disable the target state of a record type.
    TargetState {
        record_type: String,
        state: Option<String>,
        /// Disable the state update for this type, keeping the state for later.
        #[clap(long, conflicts_with = "state")]
        disable: bool,
    },
}

impl ConfigCmd {
    /// Run the `config` subcommand.
    pub async fn run(self, ctx: EbcContext) -> Result<()> {
        match self.action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => return ctx.print_settings().await,
            ConfigAction::Template { template } => {
                ctx.save_template(template, |d, t| d.default_branch_name_template = t)
                    .await?;
            }
            ConfigAction::Override {
                record_type,
                template,
                disable,
            } => {
                match (template, disable) {
                    (Some(template), _) => {
                        ctx.save_template(template, |d, t| {
                            apply(
                                &mut d.branch_name_templates,
                                record_type,
                                Some(Toggle::new(true, t)),
                            )
                        })
                        .await?;
                    }
                    (None, true) => {
                        ctx.update_settings(|d| {
                            apply(&mut d.branch_name_templates, record_type, None)
                        })
                        .await?;
                    }
                    (None, false) => bail!("Provide a template or pass `--disable`."),
                }
            }
            ConfigAction::Replacement { replacement } => {
                ctx.update_settings(|d| d.non_alphanumeric_characters_replacement = replacement)
                    .await?;
            }
            ConfigAction::Lowercase { enabled } => {
                ctx.update_settings(|d| d.lowercase_branch_name = enabled)
                    .await?;
            }
            ConfigAction::UpdateState { enabled } => {
                ctx.update_settings(|d| d.update_record_state = enabled)
                    .await?;
            }
            ConfigAction::TargetState {
                record_type,
                state,
                disable,
            } => {
                let toggle = match (state, disable) {
                    (Some(state), _) => Some(Toggle::new(true, state)),
                    (None, true) => None,
                    (None, false) => bail!("Provide a state or pass `--disable`."),
                };
                ctx.update_settings(|d| apply(&mut d.record_states, record_type, toggle))
                    .await?;
            }
        }

        println!(
            "{} settings of project `{}`.",
            OK_COLOR.paint("Updated"),
            NAME_COLOR.paint(&ctx.project)
        );
        Ok(())
    }
}

/// Activates `toggle` for `record_type`, or deactivates the existing entry when [None].
fn apply(
    map: &mut std::collections::BTreeMap<String, Toggle<String>>,
    record_type: String,
    toggle: Option<Toggle<String>>,
) {
    match toggle {
        Some(toggle) => {
            map.insert(record_type, toggle);
        }
        None => {
            map.entry(record_type).or_default().active = false;
        }
    }
}
