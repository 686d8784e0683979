use anyhow::{Context, Result};
use replacer::cli::{parse_args, Args, ExecuteOptions};
use replacer::config::{self, Config};
use replacer::diff_formatter::DiffFormatter;
use replacer::error_helpers;
use replacer::logger::{self, LogOptions};
use replacer::{Job, OutputPathBuilder, ReplaceError, Replacer, Runner, Summary, TokenValueMapParser};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

fn main() -> Result<()> {
    let args = parse_args()?;

    match args {
        Args::Execute(options) => {
            execute_command(options)?;
        }
        Args::Config {
            config,
            init,
            force,
            path,
        } => {
            config_command(config, init, force, path)?;
        }
    }

    Ok(())
}

fn execute_command(options: ExecuteOptions) -> Result<()> {
    let config = config::load_config(options.config.as_deref())?;
    let quiet = options.quiet || config.replace.quiet;

    let log_path = logger::init_logging(LogOptions {
        quiet,
        verbose: options.verbose,
        debug_file: config.logging.debug,
    })?;
    if let Some(log_path) = log_path {
        debug!("Debug log: {}", log_path.display());
    }

    let job = build_job(&options, &config)?;
    let parser = TokenValueMapParser::new(config.replace.map_syntax()).map_err(report)?;
    let runner = Runner::new(Replacer::new(), parser);

    if options.dry_run {
        return dry_run(&runner, &job, options.context);
    }

    // The summary line is logged at info level, so --quiet hides it
    let mut summary = Summary::new();
    runner.run(&job, &mut summary).map_err(report)?;

    if let Some(path) = &options.summary_json {
        let json = summary.to_json().context("Failed to serialize summary")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    }

    Ok(())
}

/// Merge command-line options over config defaults
fn build_job(options: &ExecuteOptions, config: &Config) -> Result<Job> {
    let base_dir = match &options.base_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    // Flags given on the command line replace the configured list
    let regex_flags = if options.regex_flags.is_empty() {
        config.replace.regex_flags.clone()
    } else {
        options.regex_flags.clone()
    };

    Ok(Job {
        files: options.files.clone(),
        rules: options.rule_source(config.replace.comments_enabled),
        regex: options.regex.unwrap_or(config.replace.regex),
        regex_flags,
        unescape: options.unescape,
        ignore_missing_file: options.ignore_missing_file,
        outputs: OutputPathBuilder::new(base_dir)
            .output_file(options.output_file.clone())
            .output_dir(options.output_dir.clone())
            .preserve_dir(options.preserve_dir),
    })
}

fn dry_run(runner: &Runner, job: &Job, context: usize) -> Result<()> {
    let plan = runner.plan(job).map_err(report)?;

    print!("{}", DiffFormatter::format_dry_run_header(plan.rules.len()));

    for (source, destination) in &plan.pairs {
        let (original, transformed) = runner
            .replacer()
            .preview(&plan.rules, plan.regex, source, plan.regex_flags)
            .map_err(report)?;
        print!(
            "{}",
            DiffFormatter::format_preview(source, destination, &original, &transformed, context)
        );
    }

    Ok(())
}

fn config_command(explicit: Option<PathBuf>, init: bool, force: bool, path: bool) -> Result<()> {
    let config_path = match &explicit {
        Some(path) => path.clone(),
        None => config::config_file_path()?,
    };

    if path {
        println!("Config file: {}", config_path.display());
        if let Some(log_path) = logger::get_log_path() {
            println!("Debug log:   {}", log_path.display());
        }
        return Ok(());
    }

    if init {
        if config_path.exists() && !force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                config_path.display()
            );
        }
        config::save_default_config(&config_path)?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let config = config::load_config(explicit.as_deref())?;
    let config_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", config_str);

    Ok(())
}

fn report(err: ReplaceError) -> anyhow::Error {
    anyhow::anyhow!(error_helpers::describe(&err))
}
