//! Run orchestration
//!
//! A [`Job`] describes one run: which files, where the rules come from, and
//! how tokens are matched. [`Runner`] turns a job into rules and file pairs
//! and hands each pair to its [`FileReplacer`], recording successes in the
//! caller's [`Summary`].

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::ReplaceError;
use crate::output_path::OutputPathBuilder;
use crate::regex_flags;
use crate::replacement::{self, ReplacementRule};
use crate::replacer::{FileReplacer, Replacer};
use crate::summary::Summary;
use crate::token_value_map::TokenValueMapParser;

/// Where the replacement rules of a run come from.
#[derive(Debug, Clone)]
pub enum RuleSource {
    /// Rules assembled by the caller
    Rules(Vec<ReplacementRule>),
    /// A delimited token-value map file
    MapFile {
        path: PathBuf,
        comments_enabled: bool,
        per_line_regex: bool,
    },
    /// A compact `token=value,token=value` definition
    Variable(String),
    /// A single token/value pair, optionally wrapped in delimiters
    Token {
        token: String,
        value: String,
        delimiters: Vec<String>,
    },
    /// Token and value read from files, optionally wrapped in delimiters
    TokenFiles {
        token_file: PathBuf,
        value_file: PathBuf,
        delimiters: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub files: Vec<PathBuf>,
    pub rules: RuleSource,
    pub regex: bool,
    pub regex_flags: Vec<String>,
    pub unescape: bool,
    pub ignore_missing_file: bool,
    pub outputs: OutputPathBuilder,
}

impl Job {
    pub fn new(files: Vec<PathBuf>, rules: RuleSource) -> Self {
        Self {
            files,
            rules,
            regex: true,
            regex_flags: Vec::new(),
            unescape: false,
            ignore_missing_file: false,
            outputs: OutputPathBuilder::default(),
        }
    }
}

/// Everything needed to process a job, resolved up front.
#[derive(Debug, Clone)]
pub struct Plan {
    pub rules: Vec<ReplacementRule>,
    pub regex: bool,
    pub regex_flags: u32,
    /// `(source, destination)` pairs in input order
    pub pairs: Vec<(PathBuf, PathBuf)>,
}

pub struct Runner<R: FileReplacer = Replacer> {
    replacer: R,
    parser: TokenValueMapParser,
}

impl Default for Runner<Replacer> {
    fn default() -> Self {
        Self::new(Replacer::new(), TokenValueMapParser::default())
    }
}

impl<R: FileReplacer> Runner<R> {
    pub fn new(replacer: R, parser: TokenValueMapParser) -> Self {
        Self { replacer, parser }
    }

    pub fn replacer(&self) -> &R {
        &self.replacer
    }

    /// Resolve rules, regex flags, and file pairs without touching any file
    /// content. Missing inputs are dropped here when the job ignores them.
    pub fn plan(&self, job: &Job) -> Result<Plan, ReplaceError> {
        if job.ignore_missing_file && job.files.len() != 1 {
            return Err(ReplaceError::IgnoreMissingFileWithoutFile);
        }

        let mut pairs = Vec::with_capacity(job.files.len());
        for file in &job.files {
            let source = job.outputs.source_for(file);
            if job.ignore_missing_file && !source.exists() {
                info!("Path to file to replace does not exist, skipping: {}", source.display());
                continue;
            }
            let destination = job.outputs.destination_for(file);
            pairs.push((source, destination));
        }

        if job.ignore_missing_file && pairs.is_empty() {
            return Ok(Plan {
                rules: Vec::new(),
                regex: job.regex,
                regex_flags: 0,
                pairs,
            });
        }

        let regex_flags = regex_flags::compile(job.regex_flags.as_slice())?;
        let rules = self.build_rules(job)?;
        debug!("Built {} replacement rule(s)", rules.len());

        Ok(Plan {
            rules,
            regex: job.regex,
            regex_flags,
            pairs,
        })
    }

    /// Process every file of `job`, recording each written pair in `summary`.
    ///
    /// Stops at the first failing file.
    pub fn run(&self, job: &Job, summary: &mut Summary) -> Result<Plan, ReplaceError> {
        let plan = self.plan(job)?;
        for (source, destination) in &plan.pairs {
            self.replacer
                .replace(&plan.rules, plan.regex, source, destination, plan.regex_flags)?;
            summary.record(source, destination);
        }
        info!("{}", summary.render());
        Ok(plan)
    }

    fn build_rules(&self, job: &Job) -> Result<Vec<ReplacementRule>, ReplaceError> {
        match &job.rules {
            RuleSource::Rules(rules) => Ok(rules.clone()),
            RuleSource::MapFile {
                path,
                comments_enabled,
                per_line_regex,
            } => {
                let path = job.outputs.source_for(path);
                self.parser
                    .clone()
                    .with_unescape(job.unescape)
                    .from_file(&path, *comments_enabled, *per_line_regex)
            }
            RuleSource::Variable(definition) => {
                self.parser
                    .from_variable_definition(definition, job.unescape, job.regex)
            }
            RuleSource::Token {
                token,
                value,
                delimiters,
            } => {
                if token.is_empty() {
                    return Err(ReplaceError::MissingToken);
                }
                Ok(replacement::with_delimiters(
                    token,
                    value,
                    delimiters.as_slice(),
                    job.unescape,
                    job.regex,
                ))
            }
            RuleSource::TokenFiles {
                token_file,
                value_file,
                delimiters,
            } => {
                let rule = replacement::from_token_value_files(
                    &job.outputs.source_for(token_file),
                    &job.outputs.source_for(value_file),
                    job.unescape,
                )?;
                if rule.raw_token().is_empty() {
                    return Err(ReplaceError::MissingToken);
                }
                Ok(replacement::with_delimiters(
                    rule.raw_token(),
                    rule.raw_value(),
                    delimiters.as_slice(),
                    job.unescape,
                    job.regex,
                ))
            }
        }
    }
}
