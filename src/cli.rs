use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::runner::RuleSource;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "replacer")]
#[command(about = "Replace tokens in files with literal or regex matching")]
#[command(long_about = "replacer rewrites tokens in files.

Rules come from exactly one source: a token and value, a token file and value
file, a token-value map file, or a variable definition. Rules are applied in
order, each one on the output of the previous one. Files are rewritten in
place unless an output file or output directory is given.

RULE SOURCES:
  -t TOKEN -v VALUE            Single token/value pair
  --token-file F --value-file F Token and value read from files
  -m, --token-value-map FILE   One token=value per line, # comments
  --variable-map 'A=1,B=2'     Compact inline definition

MATCHING:
  Tokens are regular expressions by default (see ~/.replacer/config.toml).
  Values are always literal: '$1' is written as '$1'.

EXAMPLES:
  replacer -t @VERSION@ -v 1.2.3 pom.xml
  replacer -t VERSION -v 1.2.3 -d @ -d '${*}' app.conf
  replacer --no-regex -t 'a.b' -v x notes.txt
  replacer -m tokens.properties -o target/app.conf app.conf
  replacer --variable-map 'HOST=localhost,PORT=8080' --dry-run app.conf
  replacer -t ';' -v '\\n' --unescape data.txt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Files to process
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Token to replace
    #[arg(short = 't', long, value_name = "TOKEN")]
    #[arg(conflicts_with_all = ["token_file", "token_value_map", "variable_map"])]
    token: Option<String>,

    /// Replacement value (default: empty, which removes the token)
    #[arg(short = 'v', long, value_name = "VALUE", requires = "token", allow_hyphen_values = true)]
    value: Option<String>,

    /// Read the token from a file
    #[arg(long, value_name = "FILE", requires = "value_file")]
    #[arg(conflicts_with_all = ["token_value_map", "variable_map"])]
    token_file: Option<PathBuf>,

    /// Read the value from a file
    #[arg(long, value_name = "FILE", requires = "token_file")]
    value_file: Option<PathBuf>,

    /// Token-value map file (one token=value per line)
    #[arg(short = 'm', long, value_name = "FILE", conflicts_with = "variable_map")]
    token_value_map: Option<PathBuf>,

    /// Inline token-value definition, e.g. 'A=1,B=2'
    #[arg(long, value_name = "DEFINITION")]
    variable_map: Option<String>,

    /// Wrap the token in delimiters; '*' marks where the token goes
    #[arg(short = 'd', long = "delimiter", value_name = "DELIM")]
    #[arg(help = "Wrap the token in a delimiter (repeatable)\n'@' matches @TOKEN@, '${*}' matches ${TOKEN}")]
    delimiters: Vec<String>,

    /// Treat tokens as regular expressions
    #[arg(long, conflicts_with = "no_regex")]
    regex: bool,

    /// Treat tokens as literal text
    #[arg(long = "no-regex")]
    no_regex: bool,

    /// Regex modifier (repeatable), e.g. CASE_INSENSITIVE, MULTILINE, DOTALL
    #[arg(short = 'f', long = "regex-flag", value_name = "FLAG")]
    regex_flags: Vec<String>,

    /// Decode escape sequences such as \n and \t in tokens and values
    #[arg(short = 'u', long)]
    unescape: bool,

    /// Don't skip comment lines in token-value map files
    #[arg(long = "no-comments")]
    no_comments: bool,

    /// Force regex matching for every token-value map entry
    #[arg(long)]
    per_line_regex: bool,

    /// Write the result to this file instead of rewriting the input
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with = "output_dir")]
    output_file: Option<PathBuf>,

    /// Write results into this directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Keep the input directory layout under --output-dir
    #[arg(long, requires = "output_dir")]
    preserve_dir: bool,

    /// Directory relative paths are resolved against
    #[arg(short = 'b', long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Skip the input silently (with an info log) if it does not exist
    #[arg(long)]
    ignore_missing_file: bool,

    /// Don't print the summary
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Show debug logs on stderr
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Preview changes without writing any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Number of context lines in the dry-run preview
    #[arg(short = 'C', long, value_name = "NUM", default_value_t = 2)]
    context: usize,

    /// Also write the summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,

    /// Use this config file instead of ~/.replacer/config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or create the configuration file
    #[command(long_about = "Show or create the configuration file.

Without flags, prints the effective configuration as TOML.

EXAMPLES:
  replacer config                 Show effective configuration
  replacer config --init          Write a commented default config
  replacer config --path          Print the config and log file locations")]
    Config {
        /// Write a commented default configuration file
        #[arg(long, conflicts_with = "path")]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,

        /// Print config and log file locations
        #[arg(long)]
        path: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    into_args(Cli::parse())
}

/// Parse from an explicit argument list (first item is the program name)
pub fn parse_args_from<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).context("Invalid arguments")?;
    into_args(cli)
}

fn into_args(cli: Cli) -> Result<Args> {
    match cli.command {
        Some(Commands::Config { init, force, path }) => Ok(Args::Config {
            config: cli.config,
            init,
            force,
            path,
        }),
        None => {
            if cli.files.is_empty() {
                anyhow::bail!("No input files. Usage: replacer -t TOKEN -v VALUE FILE...");
            }

            let rules = if let Some(token) = cli.token {
                RuleInput::Token {
                    token,
                    value: cli.value.unwrap_or_default(),
                }
            } else if let (Some(token_file), Some(value_file)) = (cli.token_file, cli.value_file) {
                RuleInput::TokenFiles { token_file, value_file }
            } else if let Some(path) = cli.token_value_map {
                RuleInput::MapFile(path)
            } else if let Some(definition) = cli.variable_map {
                RuleInput::Variable(definition)
            } else {
                anyhow::bail!(
                    "No replacement rules. Use --token, --token-file, --token-value-map or --variable-map"
                );
            };

            if cli.output_file.is_some() && cli.files.len() > 1 {
                anyhow::bail!("--output-file can only be used with a single input file");
            }

            // Determine regex mode (None falls back to config)
            let regex = if cli.no_regex {
                Some(false)
            } else if cli.regex {
                Some(true)
            } else {
                None
            };

            Ok(Args::Execute(ExecuteOptions {
                files: cli.files,
                rules,
                delimiters: cli.delimiters,
                regex,
                regex_flags: cli.regex_flags,
                unescape: cli.unescape,
                comments_enabled: if cli.no_comments { Some(false) } else { None },
                per_line_regex: cli.per_line_regex,
                output_file: cli.output_file,
                output_dir: cli.output_dir,
                preserve_dir: cli.preserve_dir,
                base_dir: cli.base_dir,
                ignore_missing_file: cli.ignore_missing_file,
                quiet: cli.quiet,
                verbose: cli.verbose,
                dry_run: cli.dry_run,
                context: cli.context,
                summary_json: cli.summary_json,
                config: cli.config,
            }))
        }
    }
}

/// Rule source as given on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum RuleInput {
    Token { token: String, value: String },
    TokenFiles { token_file: PathBuf, value_file: PathBuf },
    MapFile(PathBuf),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOptions {
    pub files: Vec<PathBuf>,
    pub rules: RuleInput,
    pub delimiters: Vec<String>,
    pub regex: Option<bool>,
    pub regex_flags: Vec<String>,
    pub unescape: bool,
    pub comments_enabled: Option<bool>,
    pub per_line_regex: bool,
    pub output_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub preserve_dir: bool,
    pub base_dir: Option<PathBuf>,
    pub ignore_missing_file: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub context: usize,
    pub summary_json: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ExecuteOptions {
    /// Build the rule source, with `comments_enabled` as the config default
    pub fn rule_source(&self, comments_enabled: bool) -> RuleSource {
        match &self.rules {
            RuleInput::Token { token, value } => RuleSource::Token {
                token: token.clone(),
                value: value.clone(),
                delimiters: self.delimiters.clone(),
            },
            RuleInput::TokenFiles { token_file, value_file } => RuleSource::TokenFiles {
                token_file: token_file.clone(),
                value_file: value_file.clone(),
                delimiters: self.delimiters.clone(),
            },
            RuleInput::MapFile(path) => RuleSource::MapFile {
                path: path.clone(),
                comments_enabled: self.comments_enabled.unwrap_or(comments_enabled),
                per_line_regex: self.per_line_regex,
            },
            RuleInput::Variable(definition) => RuleSource::Variable(definition.clone()),
        }
    }
}

#[derive(Debug)]
pub enum Args {
    Execute(ExecuteOptions),
    Config {
        config: Option<PathBuf>,
        init: bool,
        force: bool,
        path: bool,
    },
}
