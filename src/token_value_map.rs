//! Token-value map parsing
//!
//! Two textual forms produce ordered rule lists:
//!
//! * a delimited map, one `token=value` pair per line, optionally with
//!   `#` comment lines;
//! * a compact variable definition, `token=value,token=value`.
//!
//! The first unescaped separator splits token from value, so `a\=b=c` maps
//! the token `a=b` to `c`. Surrounding whitespace is trimmed from both sides.

use std::fs;
use std::path::Path;

use crate::error::ReplaceError;
use crate::replacement::ReplacementRule;

/// Characters that structure a token-value map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSyntax {
    /// Splits a token from its value
    pub separator: String,
    /// Starts a comment line when comments are enabled
    pub comment_marker: String,
    /// Splits entries in a variable definition
    pub entry_separator: String,
}

impl MapSyntax {
    /// Check that both separators are usable for splitting.
    ///
    /// The comment marker is checked when parsing, since it only matters
    /// with comments enabled.
    pub fn validate(&self) -> Result<(), ReplaceError> {
        let invalid = |reason: String| Err(ReplaceError::InvalidMapSyntax { reason });

        if self.separator.is_empty() {
            return invalid("separator must not be empty".to_string());
        }
        if self.entry_separator.is_empty() {
            return invalid("entry separator must not be empty".to_string());
        }
        if self.entry_separator == self.separator {
            return invalid(format!(
                "entry separator `{}` is also the token/value separator",
                self.entry_separator
            ));
        }
        Ok(())
    }
}

impl Default for MapSyntax {
    fn default() -> Self {
        Self {
            separator: "=".to_string(),
            comment_marker: "#".to_string(),
            entry_separator: ",".to_string(),
        }
    }
}

/// Parser turning token-value maps into replacement rules.
#[derive(Debug, Clone, Default)]
pub struct TokenValueMapParser {
    syntax: MapSyntax,
    unescape: bool,
}

impl TokenValueMapParser {
    pub fn new(syntax: MapSyntax) -> Result<Self, ReplaceError> {
        syntax.validate()?;
        Ok(Self {
            syntax,
            unescape: false,
        })
    }

    /// Mark every rule produced from delimited text as `unescape`.
    pub fn with_unescape(mut self, unescape: bool) -> Self {
        self.unescape = unescape;
        self
    }

    pub fn syntax(&self) -> &MapSyntax {
        &self.syntax
    }

    /// Parse one `token=value` pair per line.
    ///
    /// Blank lines are skipped. Comment lines are skipped only when
    /// `comments_enabled`; otherwise they must parse like any other line.
    /// With `per_line_regex` every rule is forced into regex mode, otherwise
    /// rules inherit the run-level setting.
    pub fn from_delimited_text(
        &self,
        text: &str,
        comments_enabled: bool,
        per_line_regex: bool,
    ) -> Result<Vec<ReplacementRule>, ReplaceError> {
        if comments_enabled && self.syntax.comment_marker.is_empty() {
            return Err(ReplaceError::InvalidMapSyntax {
                reason: "comment marker must not be empty while comments are enabled".to_string(),
            });
        }

        let regex = per_line_regex.then_some(true);
        let mut rules = Vec::new();

        for (line_index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if comments_enabled && trimmed.starts_with(self.syntax.comment_marker.as_str()) {
                continue;
            }

            let (token, value) = self.split_entry(trimmed, line_index + 1)?;
            rules.push(
                ReplacementRule::new(token, value)
                    .with_unescape(self.unescape)
                    .with_regex(regex),
            );
        }

        Ok(rules)
    }

    /// Read a map file and parse it with [`Self::from_delimited_text`].
    pub fn from_file(
        &self,
        path: &Path,
        comments_enabled: bool,
        per_line_regex: bool,
    ) -> Result<Vec<ReplacementRule>, ReplaceError> {
        let text = fs::read_to_string(path).map_err(|source| ReplaceError::TokenFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.from_delimited_text(&text, comments_enabled, per_line_regex)
    }

    /// Parse `token=value[,token=value...]`; every rule shares `unescape`
    /// and `regex`. Empty entries (such as a trailing comma) are ignored.
    pub fn from_variable_definition(
        &self,
        text: &str,
        unescape: bool,
        regex: bool,
    ) -> Result<Vec<ReplacementRule>, ReplaceError> {
        let mut rules = Vec::new();

        for (entry_index, entry) in split_unescaped(text, &self.syntax.entry_separator)
            .into_iter()
            .enumerate()
        {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let (token, value) = self.split_entry(entry, entry_index + 1)?;
            let entry_separator = &self.syntax.entry_separator;
            let escaped = format!("\\{entry_separator}");
            let token = token.replace(&escaped, entry_separator);
            let value = value.replace(&escaped, entry_separator);
            rules.push(
                ReplacementRule::new(token, value)
                    .with_unescape(unescape)
                    .with_regex(Some(regex)),
            );
        }

        Ok(rules)
    }

    fn split_entry(&self, entry: &str, position: usize) -> Result<(String, String), ReplaceError> {
        let separator = self.syntax.separator.as_str();
        let malformed = || ReplaceError::MalformedMapEntry {
            position,
            entry: entry.to_string(),
        };

        let at = find_unescaped(entry, separator).ok_or_else(malformed)?;
        let token = entry[..at]
            .trim()
            .replace(&format!("\\{separator}"), separator);
        if token.is_empty() {
            return Err(malformed());
        }
        let value = entry[at + separator.len()..].trim().to_string();

        Ok((token, value))
    }
}

/// Byte offset of the first `needle` not escaped by a backslash.
///
/// A run of backslashes escapes the needle only when its length is odd, so
/// `\\=` is an escaped backslash followed by a real separator.
fn find_unescaped(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(relative) = haystack[from..].find(needle) {
        let at = from + relative;
        let backslashes = haystack[..at]
            .bytes()
            .rev()
            .take_while(|&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            return Some(at);
        }
        from = at + needle.len();
    }
    None
}

fn split_unescaped<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = find_unescaped(rest, separator) {
        parts.push(&rest[..at]);
        rest = &rest[at + separator.len()..];
    }
    parts.push(rest);
    parts
}

/// Parse delimited text with the default `=` / `#` syntax.
pub fn from_delimited_text(
    text: &str,
    comments_enabled: bool,
    per_line_regex: bool,
) -> Result<Vec<ReplacementRule>, ReplaceError> {
    TokenValueMapParser::default().from_delimited_text(text, comments_enabled, per_line_regex)
}

/// Parse a variable definition with the default `=` / `,` syntax.
pub fn from_variable_definition(
    text: &str,
    unescape: bool,
    regex: bool,
) -> Result<Vec<ReplacementRule>, ReplaceError> {
    TokenValueMapParser::default().from_variable_definition(text, unescape, regex)
}
