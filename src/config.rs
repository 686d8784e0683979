//! Configuration management for replacer
//!
//! Defaults live in ~/.replacer/config.toml. Command-line flags override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::regex_flags;
use crate::token_value_map::MapSyntax;

/// replacer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Replacement defaults
    #[serde(default)]
    pub replace: ReplaceConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Treat tokens as regular expressions
    #[serde(default = "default_regex")]
    pub regex: bool,

    /// Regex modifiers, e.g. ["CASE_INSENSITIVE", "MULTILINE"]
    #[serde(default)]
    pub regex_flags: Vec<String>,

    /// Skip comment lines in token-value map files
    #[serde(default = "default_comments_enabled")]
    pub comments_enabled: bool,

    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,

    /// Splits token from value in map files and variable definitions
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Splits entries in variable definitions
    #[serde(default = "default_entry_separator")]
    pub entry_separator: String,

    /// Collect the summary but don't print it
    #[serde(default)]
    pub quiet: bool,
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            regex: default_regex(),
            regex_flags: Vec::new(),
            comments_enabled: default_comments_enabled(),
            comment_marker: default_comment_marker(),
            separator: default_separator(),
            entry_separator: default_entry_separator(),
            quiet: false,
        }
    }
}

impl ReplaceConfig {
    pub fn map_syntax(&self) -> MapSyntax {
        MapSyntax {
            separator: self.separator.clone(),
            comment_marker: self.comment_marker.clone(),
            entry_separator: self.entry_separator.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write debug logs to ~/.replacer/replacer.log
    #[serde(default)]
    pub debug: bool,
}

// Default functions for serde
fn default_regex() -> bool { true }
fn default_comments_enabled() -> bool { true }
fn default_comment_marker() -> String { "#".to_string() }
fn default_separator() -> String { "=".to_string() }
fn default_entry_separator() -> String { ",".to_string() }

/// Directory holding the config file and debug log
pub fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".replacer"))
}

/// Get the default configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r##"# replacer Configuration File
#
# Values set here can be overridden by command-line flags.

[replace]
# Treat tokens as regular expressions (default: true)
regex = true

# Regex modifiers applied when compiling tokens (default: none)
# Known: UNIX_LINES, CASE_INSENSITIVE, COMMENTS, MULTILINE, LITERAL,
#        DOTALL, UNICODE_CASE, CANON_EQ
regex_flags = []

# Skip comment lines in token-value map files (default: true)
comments_enabled = true
comment_marker = "#"

# Token/value separator for map files and variable definitions (default: "=")
separator = "="

# Entry separator for variable definitions (default: ",")
entry_separator = ","

# Don't print the run summary (default: false)
quiet = false

[logging]
# Write debug logs to ~/.replacer/replacer.log (default: false)
debug = false
"##
}

/// Save the default commented configuration file
pub fn save_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    fs::write(path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

    Ok(())
}

/// Parse configuration from TOML text
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration
///
/// An explicit path must exist. Without one, the default file is used when
/// present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = config_file_path()?;
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    parse_config(&config_str)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    let replace = &config.replace;

    if replace.separator.is_empty() {
        anyhow::bail!("Invalid separator: must not be empty");
    }

    if replace.entry_separator.is_empty() {
        anyhow::bail!("Invalid entry_separator: must not be empty");
    }

    if replace.entry_separator == replace.separator {
        anyhow::bail!(
            "Invalid entry_separator: '{}' is also the token/value separator",
            replace.entry_separator
        );
    }

    if replace.comments_enabled && replace.comment_marker.is_empty() {
        anyhow::bail!("Invalid comment_marker: must not be empty while comments are enabled");
    }

    regex_flags::compile(replace.regex_flags.as_slice())
        .context("Invalid regex_flags")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.replace.regex);
        assert!(config.replace.regex_flags.is_empty());
        assert!(config.replace.comments_enabled);
        assert_eq!(config.replace.comment_marker, "#");
        assert_eq!(config.replace.separator, "=");
        assert_eq!(config.replace.entry_separator, ",");
        assert!(!config.replace.quiet);
        assert!(!config.logging.debug);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let template = get_default_config_content();
        assert!(template.contains("comment_marker = \"#\"\n"));
        assert!(template.trim_end().ends_with("debug = false"));

        let config = parse_config(template).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config("[replace]\nregex = false\n").unwrap();
        assert!(!config.replace.regex);
        assert_eq!(config.replace.separator, "=");
        assert!(!config.logging.debug);
    }

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_empty_separator() {
        let mut config = Config::default();
        config.replace.separator = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_clashing_separators() {
        let mut config = Config::default();
        config.replace.entry_separator = "=".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_unknown_flag() {
        let mut config = Config::default();
        config.replace.regex_flags = vec!["MULTILINE".to_string(), "SHOUTY".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(format!("{err:#}").contains("SHOUTY"));
    }

    #[test]
    fn test_empty_comment_marker_allowed_without_comments() {
        let mut config = Config::default();
        config.replace.comment_marker = String::new();
        assert!(validate_config(&config).is_err());
        config.replace.comments_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[replace]\nregex_flags = [\"DOTALL\"]\n[logging]\ndebug = true\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.replace.regex_flags, vec!["DOTALL".to_string()]);
        assert!(config.logging.debug);
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_malformed_config_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[replace\nregex = ").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_save_default_config_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        save_default_config(&path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[replace]"));
        assert!(toml_str.contains("[logging]"));
    }
}
