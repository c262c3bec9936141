//! CLI argument definitions for the ingress pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ingress_model::{SupplementaryPolicy, TransformKind};

#[derive(Parser)]
#[command(
    name = "ingress",
    version,
    about = "Dataset ingress - verify, transform and upload statistical data submissions",
    long_about = "Verify a submission's files against its pipeline configuration, run the\n\
                  configured transform, and upload the results.\n\n\
                  Supports SDMX-ML Compact 2.0, SDMX-ML Generic 2.1 and CSV joins."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration table (default: built-in table).
    #[arg(long = "config-table", value_name = "PATH", global = true)]
    pub config_table: Option<PathBuf>,

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
    /// Process one submission directory.
    Run(RunArgs),

    /// Show the configuration an identifier resolves to.
    Resolve(ResolveArgs),

    /// List the entries of the configuration table.
    Configs,

    /// Run a transform directly over input files.
    Transform(TransformArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding the submission's decompressed files.
    #[arg(value_name = "FILES_DIR")]
    pub files_dir: PathBuf,

    /// Dataset or source identifier used to pick a configuration.
    #[arg(long = "source-id", value_name = "ID")]
    pub source_id: String,

    /// Directory receiving uploaded files (default: <FILES_DIR>/outbox).
    #[arg(long = "outbox", value_name = "DIR")]
    pub outbox: Option<PathBuf>,

    /// Policy for missing supplementary distributions (overrides SUPPLEMENTARY_POLICY).
    #[arg(long = "supplementary-policy", value_enum)]
    pub supplementary_policy: Option<PolicyArg>,

    /// Do not upload anything (overrides SKIP_DATA_UPLOAD).
    #[arg(long = "skip-upload")]
    pub skip_upload: bool,

    /// Do not emit notifications (overrides DISABLE_NOTIFICATIONS).
    #[arg(long = "disable-notifications")]
    pub disable_notifications: bool,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Dataset or source identifier to resolve.
    #[arg(value_name = "ID")]
    pub source_id: String,

    /// Print the configuration as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Transform to run.
    #[arg(value_enum)]
    pub kind: TransformArg,

    /// Input files, in the order the transform expects.
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// JSON template merged into the generated metadata.
    #[arg(long = "metadata-template", value_name = "PATH")]
    pub metadata_template: Option<PathBuf>,

    /// Fail on header field mismatches instead of warning.
    #[arg(long = "strict-header")]
    pub strict_header: bool,
}

/// Transforms selectable on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum TransformArg {
    #[value(name = "sdmx-compact-2-0")]
    SdmxCompact20,
    #[value(name = "sdmx-generic-2-1")]
    SdmxGeneric21,
    CsvJoin,
}

impl From<TransformArg> for TransformKind {
    fn from(value: TransformArg) -> Self {
        match value {
            TransformArg::SdmxCompact20 => Self::SdmxCompact20,
            TransformArg::SdmxGeneric21 => Self::SdmxGeneric21,
            TransformArg::CsvJoin => Self::CsvJoin,
        }
    }
}

/// Supplementary distribution policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Abort,
    Notify,
}

impl From<PolicyArg> for SupplementaryPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Abort => Self::Abort,
            PolicyArg::Notify => Self::NotifyAndContinue,
        }
    }
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
