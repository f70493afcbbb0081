//! Contains the formatting logic for the [EbcContext] struct.

use super::EbcContext;
use crate::{
    constants::{ERR_COLOR, NAME_COLOR, OK_COLOR},
    records::RecordStore,
    settings::{SettingsDocument, SettingsStore, Toggle},
    template::Validation,
};
use anyhow::Result;
use std::{
    collections::BTreeSet,
    fmt::Write,
};

impl EbcContext {
    /// Prints the project's settings, listing every known record type.
    pub async fn print_settings(&self) -> Result<()> {
        let document = self.settings.get_settings(&self.project).await?;
        let record_types = self.records.record_types(&self.project).await?;

        let mut buf = String::new();
        write_settings(&mut buf, &document, &record_types)?;
        print!("{}", buf);
        Ok(())
    }
}

/// Writes a human-readable rendition of `document` to `w`.
pub(crate) fn write_settings<W: Write>(
    w: &mut W,
    document: &SettingsDocument,
    record_types: &[String],
) -> std::fmt::Result {
    writeln!(w, "Project:          {}", NAME_COLOR.paint(&document.id))?;
    writeln!(w, "Template:         {}", document.default_branch_name_template)?;
    writeln!(
        w,
        "Replacement:      {}",
        document.non_alphanumeric_characters_replacement
    )?;
    writeln!(w, "Lowercase:        {}", document.lowercase_branch_name)?;
    writeln!(w, "Update state:     {}", document.update_record_state)?;

    let types = record_types
        .iter()
        .map(String::as_str)
        .chain(document.branch_name_templates.keys().map(String::as_str))
        .chain(document.record_states.keys().map(String::as_str))
        .collect::<BTreeSet<_>>();
    if types.is_empty() {
        return Ok(());
    }

    writeln!(w, "Record types:")?;
    for record_type in types {
        writeln!(
            w,
            "  {} template {}",
            NAME_COLOR.paint(record_type),
            describe(document.branch_name_templates.get(record_type), "(default)")
        )?;
        if document.update_record_state {
            writeln!(
                w,
                "  {} state    {}",
                " ".repeat(record_type.chars().count()),
                describe(document.record_states.get(record_type), "(unchanged)")
            )?;
        }
    }
    Ok(())
}

fn describe(toggle: Option<&Toggle<String>>, fallback: &str) -> String {
    match toggle {
        Some(Toggle { active: true, value }) => value.clone(),
        Some(Toggle { active: false, value }) if !value.is_empty() => {
            format!("{} (inactive: {})", fallback, value)
        }
        _ => fallback.to_string(),
    }
}

/// Writes the outcome of a template validation to `w`.
pub(crate) fn write_validation<W: Write>(
    w: &mut W,
    template: &str,
    validation: &Validation,
) -> std::fmt::Result {
    if validation.is_valid() {
        return writeln!(w, "{} {}", OK_COLOR.paint("Valid:"), template);
    }
    writeln!(w, "{} {}", ERR_COLOR.paint("Invalid:"), template)?;
    validation
        .messages()
        .iter()
        .try_for_each(|message| writeln!(w, "  - {}", message))
}
