//! Syntax and field checks for branch name templates.

use super::tokenizer::{has_tokens, tokens};
use crate::constants::PSEUDO_FIELDS;
use itertools::Itertools;
use std::{collections::HashSet, fmt};

/// A single problem found in a template.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum TemplateError {
    /// The template holds no token at all.
    InvalidSyntax,
    /// `${` or `}` appears outside a recognized token.
    UnbalancedDelimiters,
    /// A token references a field that does not exist.
    UnknownField(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSyntax => write!(f, "The template is invalid."),
            Self::UnbalancedDelimiters => write!(
                f,
                "The number of opening '${{' and closing '}}' tokens should be equal."
            ),
            Self::UnknownField(name) => write!(f, "Field '{}' does not exist.", name),
        }
    }
}

/// The result of validating a template. Empty when the template is valid.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct Validation {
    pub(crate) errors: Vec<TemplateError>,
}

impl Validation {
    pub(crate) fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable messages, one per error, in discovery order.
    pub(crate) fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Validates `template` against the `known_fields` of the record store.
///
/// The pseudo-fields derived from the source branch are always known.
pub(crate) fn validate_template<'a, I>(template: &str, known_fields: I) -> Validation
where
    I: IntoIterator<Item = &'a str>,
{
    if !has_tokens(template) {
        return Validation {
            errors: vec![TemplateError::InvalidSyntax],
        };
    }

    let tokens = tokens(template);
    let opening = template.matches("${").count();
    let closing = template.matches('}').count();
    if tokens.len() != opening || tokens.len() != closing {
        return Validation {
            errors: vec![TemplateError::UnbalancedDelimiters],
        };
    }

    let known = known_fields
        .into_iter()
        .chain(PSEUDO_FIELDS)
        .collect::<HashSet<_>>();
    let errors = tokens
        .iter()
        .map(|t| t.field_name())
        .filter(|name| !known.contains(name))
        .map(|name| TemplateError::UnknownField(name.to_string()))
        .collect_vec();

    Validation { errors }
}
