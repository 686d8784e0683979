//! Logging support for replacer
//!
//! Diagnostics go to stderr, filtered by `RUST_LOG` when set. When debug mode
//! is enabled via config, debug-level logs are also appended to
//! ~/.replacer/replacer.log.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

const LOG_FILE_NAME: &str = "replacer.log";

/// How chatty the stderr output should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub quiet: bool,
    pub verbose: bool,
    /// Also log to the debug file
    pub debug_file: bool,
}

/// Initialize the logging system
///
/// Returns the path to the debug log file, or None if file logging is not
/// enabled or the file could not be created.
pub fn init_logging(options: LogOptions) -> Result<Option<PathBuf>> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let (file_layer, log_path) = if options.debug_file {
        match prepare_log_dir() {
            Ok(dir) => {
                let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
                let layer = fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_filter(EnvFilter::new("replacer=debug"));
                (Some(layer), Some(dir.join(LOG_FILE_NAME)))
            }
            Err(e) => {
                // Fall back to stderr-only logging rather than failing the run
                eprintln!("Warning: Could not create log directory: {}", e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let subscriber = registry().with(stderr_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(log_path)
}

/// Filter used for stderr when `RUST_LOG` is not set
fn default_directive(options: LogOptions) -> &'static str {
    if options.quiet {
        "replacer=warn"
    } else if options.verbose {
        "replacer=debug"
    } else {
        "replacer=info"
    }
}

fn prepare_log_dir() -> Result<PathBuf> {
    let dir = crate::config::config_dir()?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the debug log file path without initializing logging
pub fn get_log_path() -> Option<PathBuf> {
    crate::config::config_dir()
        .ok()
        .map(|dir| dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(LogOptions::default()), "replacer=info");
        assert_eq!(
            default_directive(LogOptions { quiet: true, verbose: true, debug_file: false }),
            "replacer=warn"
        );
        assert_eq!(
            default_directive(LogOptions { verbose: true, ..LogOptions::default() }),
            "replacer=debug"
        );
    }

    #[test]
    fn test_get_log_path() {
        if let Some(path) = get_log_path() {
            assert!(
                path.ends_with(".replacer/replacer.log"),
                "Log path should be in .replacer directory, got: {}",
                path.display()
            );
        }
    }
}
