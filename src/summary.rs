//! Run summary
//!
//! Collects which source files were written to which destinations during one
//! run. The collector is owned by the caller and passed in explicitly.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct Summary {
    entries: Vec<SummaryEntry>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source: &Path, destination: &Path) {
        debug!(
            "Replacement run on {} and writing to {}",
            source.display(),
            destination.display()
        );
        self.entries.push(SummaryEntry {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }

    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line human readable summary.
    pub fn render(&self) -> String {
        let count = self.entries.len();
        format!(
            "Replacement run on {} file{}.",
            count,
            if count == 1 { "" } else { "s" }
        )
    }

    /// Entries as a pretty-printed JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = Summary::new();
        assert!(summary.is_empty());
        assert_eq!(summary.render(), "Replacement run on 0 files.");
    }

    #[test]
    fn test_render_pluralizes() {
        let mut summary = Summary::new();
        summary.record(Path::new("a.txt"), Path::new("a.txt"));
        assert_eq!(summary.render(), "Replacement run on 1 file.");

        summary.record(Path::new("b.txt"), Path::new("out/b.txt"));
        assert_eq!(summary.render(), "Replacement run on 2 files.");
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_entries_keep_order() {
        let mut summary = Summary::new();
        summary.record(Path::new("first"), Path::new("first.out"));
        summary.record(Path::new("second"), Path::new("second.out"));

        let sources: Vec<_> = summary.entries().iter().map(|e| e.source.clone()).collect();
        assert_eq!(sources, vec![PathBuf::from("first"), PathBuf::from("second")]);
    }

    #[test]
    fn test_to_json() {
        let mut summary = Summary::new();
        summary.record(Path::new("in.txt"), Path::new("out.txt"));

        let json = summary.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["source"], "in.txt");
        assert_eq!(parsed[0]["destination"], "out.txt");
    }
}
