//! replacer: token replacement in files
//!
//! This library exposes the replacement engine, the token-value map parser
//! and the run orchestration used by the `replacer` binary at src/main.rs.

pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod error;
pub mod error_helpers;
pub mod logger;
pub mod output_path;
pub mod regex_flags;
pub mod replacement;
pub mod replacer;
pub mod runner;
pub mod summary;
pub mod token_value_map;
pub mod unescape;

// Re-export commonly used types for convenience
pub use error::ReplaceError;
pub use output_path::OutputPathBuilder;
pub use regex_flags::RegexFlag;
pub use replacement::ReplacementRule;
pub use replacer::{FileReplacer, Replacer};
pub use runner::{Job, Plan, RuleSource, Runner};
pub use summary::Summary;
pub use token_value_map::{MapSyntax, TokenValueMapParser};
