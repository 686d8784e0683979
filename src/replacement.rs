//! Replacement rules
//!
//! A [`ReplacementRule`] is one token -> value substitution. Rules are plain
//! values: they are built fresh for every run, handed to the replacer in
//! order, and dropped afterwards.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReplaceError;
use crate::unescape::unescape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    token: String,
    value: String,
    #[serde(default)]
    unescape: bool,
    /// Per-rule regex override; `None` inherits the run-level setting
    #[serde(default)]
    regex: Option<bool>,
}

impl ReplacementRule {
    pub fn new(token: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            value: value.into(),
            unescape: false,
            regex: None,
        }
    }

    pub fn with_unescape(mut self, unescape: bool) -> Self {
        self.unescape = unescape;
        self
    }

    pub fn with_regex(mut self, regex: Option<bool>) -> Self {
        self.regex = regex;
        self
    }

    /// The token as written, before any unescaping.
    pub fn raw_token(&self) -> &str {
        &self.token
    }

    /// The value as written, before any unescaping.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// The token used for matching.
    pub fn token(&self) -> Cow<'_, str> {
        if self.unescape {
            unescape(&self.token)
        } else {
            Cow::Borrowed(&self.token)
        }
    }

    /// The value substituted for each match.
    pub fn value(&self) -> Cow<'_, str> {
        if self.unescape {
            unescape(&self.value)
        } else {
            Cow::Borrowed(&self.value)
        }
    }

    pub fn is_unescape(&self) -> bool {
        self.unescape
    }

    pub fn regex_override(&self) -> Option<bool> {
        self.regex
    }

    /// Effective regex mode given the run-level default.
    pub fn uses_regex(&self, default: bool) -> bool {
        self.regex.unwrap_or(default)
    }
}

/// Wrap `token` in each delimiter, producing one rule per delimiter.
///
/// A delimiter containing `*` is split around the first `*` into a prefix and
/// suffix (`${*}` gives `${token}`); any other delimiter is placed on both
/// sides (`@` gives `@token@`). With no delimiters the bare token is used.
///
/// With `regex` the delimiter text is escaped, so only the token itself is a
/// pattern.
pub fn with_delimiters<S: AsRef<str>>(
    token: &str,
    value: &str,
    delimiters: &[S],
    unescape: bool,
    regex: bool,
) -> Vec<ReplacementRule> {
    if delimiters.is_empty() {
        return vec![ReplacementRule::new(token, value).with_unescape(unescape)];
    }

    delimiters
        .iter()
        .map(|delimiter| {
            let wrapped = wrap_token(token, delimiter.as_ref(), regex);
            ReplacementRule::new(wrapped, value).with_unescape(unescape)
        })
        .collect()
}

fn wrap_token(token: &str, delimiter: &str, regex: bool) -> String {
    let (prefix, suffix) = delimiter.split_once('*').unwrap_or((delimiter, delimiter));
    if regex {
        format!("{}{token}{}", regex::escape(prefix), regex::escape(suffix))
    } else {
        format!("{prefix}{token}{suffix}")
    }
}

/// Build a rule whose token and value come from two small files.
///
/// One trailing line terminator is stripped from each file, since editors
/// usually add one.
pub fn from_token_value_files(
    token_file: &Path,
    value_file: &Path,
    unescape: bool,
) -> Result<ReplacementRule, ReplaceError> {
    let token = read_small_file(token_file)?;
    let value = read_small_file(value_file)?;
    Ok(ReplacementRule::new(token, value).with_unescape(unescape))
}

fn read_small_file(path: &Path) -> Result<String, ReplaceError> {
    let mut content = fs::read_to_string(path).map_err(|source| ReplaceError::TokenFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rule_without_unescape_keeps_text() {
        let rule = ReplacementRule::new(r"a\n", r"b\t");
        assert_eq!(rule.token(), r"a\n");
        assert_eq!(rule.value(), r"b\t");
    }

    #[test]
    fn test_rule_with_unescape_decodes_token_and_value() {
        let rule = ReplacementRule::new(r"a\n", r"b\t").with_unescape(true);
        assert_eq!(rule.token(), "a\n");
        assert_eq!(rule.value(), "b\t");
        assert_eq!(rule.raw_value(), r"b\t");
    }

    #[test]
    fn test_regex_override_inherits_when_unset() {
        let rule = ReplacementRule::new("t", "v");
        assert!(rule.uses_regex(true));
        assert!(!rule.uses_regex(false));

        let rule = rule.with_regex(Some(false));
        assert!(!rule.uses_regex(true));
    }

    #[test]
    fn test_delimiters_wrap_token_in_order() {
        let rules = with_delimiters("token", "value", &["@", "${*}"], false, false);
        let tokens: Vec<_> = rules.iter().map(|r| r.raw_token()).collect();
        assert_eq!(tokens, vec!["@token@", "${token}"]);
        assert!(rules.iter().all(|r| r.raw_value() == "value"));
    }

    #[test]
    fn test_regex_delimiters_are_escaped() {
        let rules = with_delimiters("VER.*", "1.0", &["@", "${*}"], false, true);
        let tokens: Vec<_> = rules.iter().map(|r| r.raw_token()).collect();
        assert_eq!(tokens, vec!["@VER.*@", r"\$\{VER.*\}"]);
    }

    #[test]
    fn test_no_delimiters_uses_bare_token() {
        let none: [&str; 0] = [];
        let rules = with_delimiters("token", "value", &none, true, true);
        assert_eq!(rules, vec![ReplacementRule::new("token", "value").with_unescape(true)]);
    }

    #[test]
    fn test_token_value_files_strip_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let token_file = dir.path().join("token.txt");
        let value_file = dir.path().join("value.txt");
        fs::write(&token_file, "token\n").unwrap();
        fs::write(&value_file, "line one\nline two\r\n").unwrap();

        let rule = from_token_value_files(&token_file, &value_file, false).unwrap();
        assert_eq!(rule.raw_token(), "token");
        assert_eq!(rule.raw_value(), "line one\nline two");
    }

    #[test]
    fn test_missing_token_file() {
        let dir = TempDir::new().unwrap();
        let err = from_token_value_files(
            &dir.path().join("missing"),
            &dir.path().join("also-missing"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ReplaceError::TokenFileRead { .. }));
    }
}
