//! Extraction of `${...}` tokens from a template string.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a single token. Field references are ASCII word characters and `.`.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[A-Za-z0-9_.]+\}").expect("token pattern is valid"));

/// A `${field}` placeholder occurrence inside a template.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Token<'a> {
    text: &'a str,
}

impl<'a> Token<'a> {
    /// The literal token text, delimiters included.
    pub(crate) fn as_str(&self) -> &'a str {
        self.text
    }

    /// The field reference inside the delimiters.
    pub(crate) fn field_name(&self) -> &'a str {
        self.text
            .strip_prefix("${")
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or(self.text)
    }
}

/// Returns every token of `template` in order of occurrence, duplicates preserved.
pub(crate) fn tokens(template: &str) -> Vec<Token<'_>> {
    scan(&TOKEN_RE, template)
        .into_iter()
        .map(|text| Token { text })
        .collect()
}

/// Collects successive matches of `re` in `haystack`, stepping past empty matches.
fn scan<'h>(re: &Regex, haystack: &'h str) -> Vec<&'h str> {
    let mut matches = Vec::new();
    let mut pos = 0;
    while pos <= haystack.len() {
        let Some(m) = re.find_at(haystack, pos) else {
            break;
        };
        matches.push(m.as_str());

        // Never rescan from the same position.
        pos = if m.end() > pos {
            m.end()
        } else {
            next_char_boundary(haystack, pos)
        };
    }
    matches
}

/// Returns `true` if `template` contains at least one token.
pub(crate) fn has_tokens(template: &str) -> bool {
    TOKEN_RE.is_match(template)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..]
        .chars()
        .next()
        .map_or(s.len() + 1, |c| pos + c.len_utf8())
}
