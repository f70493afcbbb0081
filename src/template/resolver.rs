//! Substitution of record values into a branch name template.

use super::tokenizer::tokens;
use crate::{
    constants::{SOURCE_BRANCH_NAME, SOURCE_BRANCH_NAME_TAIL, SOURCE_BRANCH_NAME_WITH_REPLACEMENT},
    records::FieldValue,
};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::{borrow::Cow, collections::BTreeMap};

static NON_ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("sanitization pattern is valid"));

/// Character rules applied while resolving a branch name.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Sanitization<'a> {
    /// Replaces every character outside `[A-Za-z0-9]` in text values.
    pub(crate) replacement: &'a str,
    /// Lowercases the fully substituted name.
    pub(crate) lowercase: bool,
}

/// What a token refers to.
enum FieldRef<'a> {
    SourceBranchName,
    SourceBranchNameWithReplacement,
    SourceBranchNameTail,
    Record(&'a str),
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(name: &'a str) -> Self {
        match name {
            SOURCE_BRANCH_NAME => Self::SourceBranchName,
            SOURCE_BRANCH_NAME_WITH_REPLACEMENT => Self::SourceBranchNameWithReplacement,
            SOURCE_BRANCH_NAME_TAIL => Self::SourceBranchNameTail,
            other => Self::Record(other),
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `replacement`.
pub(crate) fn sanitize<'a>(value: &'a str, replacement: &str) -> Cow<'a, str> {
    NON_ALPHANUMERIC_RE.replace_all(value, NoExpand(replacement))
}

/// Everything after the last `/` of `source_branch_name`, or all of it if there is none.
pub(crate) fn source_branch_tail(source_branch_name: &str) -> &str {
    source_branch_name
        .rsplit_once('/')
        .map_or(source_branch_name, |(_, tail)| tail)
}

/// Resolves `template` into a concrete branch name.
///
/// Tokens are substituted one at a time in discovery order, each replacing the first
/// remaining occurrence of its text. Lowercasing applies to the final string only.
pub(crate) fn resolve_branch_name(
    template: &str,
    fields: &BTreeMap<String, FieldValue>,
    source_branch_name: &str,
    sanitization: &Sanitization<'_>,
) -> String {
    let mut branch_name = template.to_string();

    for token in tokens(template) {
        let value = match FieldRef::from(token.field_name()) {
            FieldRef::SourceBranchName => Cow::Borrowed(source_branch_name),
            FieldRef::SourceBranchNameWithReplacement => {
                sanitize(source_branch_name, sanitization.replacement)
            }
            FieldRef::SourceBranchNameTail => Cow::Borrowed(source_branch_tail(source_branch_name)),
            FieldRef::Record(name) => match fields.get(name) {
                Some(FieldValue::Text(text)) => sanitize(text, sanitization.replacement),
                Some(FieldValue::Other(_)) => {
                    tracing::debug!(field = name, "Composite field value, substituting empty value");
                    Cow::Borrowed("")
                }
                Some(other) => Cow::Owned(other.to_string()),
                None => {
                    tracing::debug!(field = name, "Field absent on record, substituting empty value");
                    Cow::Borrowed("")
                }
            },
        };
        branch_name = branch_name.replacen(token.as_str(), &value, 1);
    }

    if sanitization.lowercase {
        branch_name = branch_name.to_lowercase();
    }
    branch_name
}
