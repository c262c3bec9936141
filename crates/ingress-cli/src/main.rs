//! Dataset ingress CLI.

use clap::{ColorChoice, Parser};
use ingress_cli::commands::{
    RunRequest, config_json, load_match_table, resolve_config, run_ingress, run_transform_files,
};
use ingress_cli::logging::{LogConfig, LogFormat, init_logging};
use ingress_cli::summary::{print_config, print_config_table, print_outcome, print_output};
use ingress_model::TransformKind;
use ingress_transform::TransformOptions;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, RunArgs, TransformArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Run(args) => {
            let table = load_match_table(cli.config_table.as_deref())?;
            let outcome = run_ingress(&table, &run_request(args))?;
            print_outcome(&outcome);
        }
        Command::Resolve(args) => {
            let table = load_match_table(cli.config_table.as_deref())?;
            let config = resolve_config(&table, &args.source_id)?;
            if args.json {
                println!("{}", config_json(config)?);
            } else {
                print_config(&args.source_id, config);
            }
        }
        Command::Configs => {
            let table = load_match_table(cli.config_table.as_deref())?;
            print_config_table(&table);
        }
        Command::Transform(args) => {
            let (kind, options) = transform_request(args);
            let output = run_transform_files(kind, &args.inputs, &options)?;
            print_output(kind.as_str(), &output);
        }
    }
    Ok(())
}

fn run_request(args: &RunArgs) -> RunRequest {
    RunRequest {
        source_id: args.source_id.clone(),
        files_dir: args.files_dir.clone(),
        outbox: args.outbox.clone(),
        supplementary_policy: args.supplementary_policy.map(Into::into),
        skip_upload: args.skip_upload,
        disable_notifications: args.disable_notifications,
    }
}

fn transform_request(args: &TransformArgs) -> (TransformKind, TransformOptions) {
    let options = TransformOptions {
        metadata_template: args.metadata_template.clone(),
        strict_header: args.strict_header,
    };
    (args.kind.into(), options)
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
