//! Typed failures raised by the replacement engine and the map parser.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building or applying replacement rules.
///
/// Each variant carries enough context (path, rule index, line number and the
/// underlying cause) for a caller to build its own user-facing message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplaceError {
    #[error("unrecognized regex flag: `{flag}`")]
    UnrecognizedFlag { flag: String },

    #[error("failed to read {}: {source}", path.display())]
    ContentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    ContentWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rule #{index}: token `{token}` is not a valid pattern: {source}")]
    InvalidPattern {
        index: usize,
        token: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed token-value entry at {position}: `{entry}` has no separator")]
    MalformedMapEntry { position: usize, entry: String },

    #[error("invalid token-value map syntax: {reason}")]
    InvalidMapSyntax { reason: String },

    #[error("rule #{index}: token is empty")]
    EmptyToken { index: usize },

    #[error("failed to read token/value file {}: {source}", path.display())]
    TokenFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no replacement rules given: set a token, a token file, or a token-value map")]
    MissingToken,

    #[error("ignoring missing files is only usable with a single input file")]
    IgnoreMissingFileWithoutFile,
}

impl ReplaceError {
    /// The I/O error underneath a read/write failure, if any.
    pub fn io_cause(&self) -> Option<&io::Error> {
        match self {
            ReplaceError::ContentRead { source, .. }
            | ReplaceError::ContentWrite { source, .. }
            | ReplaceError::TokenFileRead { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The path involved in a read/write failure, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ReplaceError::ContentRead { path, .. }
            | ReplaceError::ContentWrite { path, .. }
            | ReplaceError::TokenFileRead { path, .. } => Some(path),
            _ => None,
        }
    }

    /// True when the source file simply does not exist.
    pub fn is_missing_source(&self) -> bool {
        matches!(
            self,
            ReplaceError::ContentRead { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_flag_names_the_flag() {
        let err = ReplaceError::UnrecognizedFlag { flag: "SHOUTY".to_string() };
        assert!(err.to_string().contains("SHOUTY"));
    }

    #[test]
    fn test_missing_source_detection() {
        let err = ReplaceError::ContentRead {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_missing_source());
        assert_eq!(err.path(), Some(std::path::Path::new("/nope")));

        let err = ReplaceError::ContentWrite {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_missing_source());
    }

    #[test]
    fn test_malformed_entry_reports_position() {
        let err = ReplaceError::MalformedMapEntry { position: 4, entry: "oops".to_string() };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains("oops"));
    }
}
