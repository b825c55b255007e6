//! Item document command line tool.

use clap::{ColorChoice, Parser};
use itemdoc_cli::commands::{
    Output, run_extract, run_inspect, run_normalize, run_renumber, run_translate,
};
use itemdoc_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, InspectFormatArg, LogFormatArg, LogLevelArg};
use crate::summary::{print_extract, print_inspect, print_inspect_json, print_rewrite};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli.command) {
        Ok(has_errors) => i32::from(has_errors),
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Run one subcommand; `Ok(true)` when it finished but reported errors.
fn run(command: &Command) -> anyhow::Result<bool> {
    match command {
        Command::Inspect(args) => {
            let result = run_inspect(&args.input)?;
            match args.format {
                InspectFormatArg::Table => print_inspect(&result),
                InspectFormatArg::Json => print_inspect_json(&result)?,
            }
            Ok(result.has_errors())
        }
        Command::Normalize(args) => {
            let result = run_normalize(&args.input, &Output::from_arg(args.output.as_deref()))?;
            print_rewrite(&result);
            Ok(result.has_errors())
        }
        Command::Translate(args) => {
            let output = Output::from_arg(args.rewrite.output.as_deref());
            let result = run_translate(&args.rewrite.input, args.dx, args.dy, &output)?;
            print_rewrite(&result);
            Ok(result.has_errors())
        }
        Command::Renumber(args) => {
            let result = run_renumber(&args.input, &Output::from_arg(args.output.as_deref()))?;
            print_rewrite(&result);
            Ok(result.has_errors())
        }
        Command::Extract(args) => {
            let result = run_extract(&args.input)?;
            print_extract(&result);
            Ok(result.has_errors())
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
