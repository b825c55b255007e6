//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "itemdoc",
    version,
    about = "Inspect and rewrite circuit, flow-code and mechanics documents",
    long_about = "Inspect and rewrite circuit, flow-code and mechanics documents.\n\n\
                  Documents may be local paths or http(s)/ftp URLs when built with\n\
                  the `remote` feature. Rewritten documents go to stdout unless -o is given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print entity counts and parse issues.
    Inspect(InspectArgs),

    /// Parse and re-serialize a document in canonical form.
    Normalize(RewriteArgs),

    /// Move every item, node and connector route by an offset.
    Translate(TranslateArgs),

    /// Replace every identifier with a freshly generated one.
    Renumber(RewriteArgs),

    /// Promote a drawn region into a sub-circuit and print its pins.
    Extract(ExtractArgs),
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Document path or URL.
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Summary format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: InspectFormatArg,
}

#[derive(Parser)]
pub struct RewriteArgs {
    /// Document path or URL.
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Write the result here instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub rewrite: RewriteArgs,

    /// Horizontal offset.
    #[arg(long = "dx", allow_hyphen_values = true, default_value_t = 0)]
    pub dx: i32,

    /// Vertical offset.
    #[arg(long = "dy", allow_hyphen_values = true, default_value_t = 0)]
    pub dy: i32,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Circuit region containing external connection markers.
    #[arg(value_name = "FILE")]
    pub input: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InspectFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
