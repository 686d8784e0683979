//! The replacement engine
//!
//! Applies an ordered list of [`ReplacementRule`]s to the content of one file
//! and writes the result to a destination. Rules run sequentially: each rule
//! sees the output of the previous one.
//!
//! Nothing is written until every rule has been applied. The final content
//! goes to a temp file next to the destination which is then renamed over
//! it, so a failure never leaves a half-written destination behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use regex::NoExpand;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ReplaceError;
use crate::regex_flags::build_regex;
use crate::replacement::ReplacementRule;

/// Seam between the run orchestration and the component that touches files.
pub trait FileReplacer {
    fn replace(
        &self,
        rules: &[ReplacementRule],
        regex: bool,
        source: &Path,
        destination: &Path,
        regex_flags: u32,
    ) -> Result<(), ReplaceError>;
}

/// Stateless file-to-file replacer. Safe to share between threads as long
/// as two calls never target the same destination at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct Replacer;

impl Replacer {
    pub fn new() -> Self {
        Self
    }

    /// Apply `rules` to `content` in order and return the transformed text.
    pub fn apply(
        &self,
        content: &str,
        rules: &[ReplacementRule],
        regex: bool,
        regex_flags: u32,
    ) -> Result<String, ReplaceError> {
        let mut current = content.to_string();
        for (index, rule) in rules.iter().enumerate() {
            current = apply_rule(current, index, rule, regex, regex_flags)?;
        }
        Ok(current)
    }

    /// Read `source` and return `(original, transformed)` without writing.
    pub fn preview(
        &self,
        rules: &[ReplacementRule],
        regex: bool,
        source: &Path,
        regex_flags: u32,
    ) -> Result<(String, String), ReplaceError> {
        let original = read_content(source)?;
        let transformed = self.apply(&original, rules, regex, regex_flags)?;
        Ok((original, transformed))
    }
}

impl FileReplacer for Replacer {
    fn replace(
        &self,
        rules: &[ReplacementRule],
        regex: bool,
        source: &Path,
        destination: &Path,
        regex_flags: u32,
    ) -> Result<(), ReplaceError> {
        let (_, transformed) = self.preview(rules, regex, source, regex_flags)?;
        write_content(destination, &transformed)?;
        debug!(
            "Applied {} rule(s) to {} -> {}",
            rules.len(),
            source.display(),
            destination.display()
        );
        Ok(())
    }
}

fn apply_rule(
    content: String,
    index: usize,
    rule: &ReplacementRule,
    regex: bool,
    regex_flags: u32,
) -> Result<String, ReplaceError> {
    let token = rule.token();
    if token.is_empty() {
        return Err(ReplaceError::EmptyToken { index });
    }
    let value = rule.value();

    if rule.uses_regex(regex) {
        let re = build_regex(&token, regex_flags).map_err(|source| ReplaceError::InvalidPattern {
            index,
            token: token.to_string(),
            source,
        })?;
        // NoExpand: `$1` in a value is text, not a capture reference
        Ok(re.replace_all(&content, NoExpand(&value)).into_owned())
    } else {
        Ok(content.replace(&*token, &value))
    }
}

fn read_content(path: &Path) -> Result<String, ReplaceError> {
    fs::read_to_string(path).map_err(|source| ReplaceError::ContentRead {
        path: path.to_path_buf(),
        source,
    })
}

fn write_content(path: &Path, content: &str) -> Result<(), ReplaceError> {
    let write_err = |source| ReplaceError::ContentWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(write_err)?;

    // Temp file in the same directory so the final rename stays on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }

    temp_file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
