//! rtcontrol CLI application entry point
//!
//! # Usage
//!
//! ```bash
//! # List torrents with a ratio above 1
//! rtcontrol ratio=+1
//!
//! # Tab-separated report, largest first
//! rtcontrol -o name,size.sz,ratio -s size -r '*'
//!
//! # Stop everything from one tracker, asking first
//! rtcontrol -i --stop alias=PUB
//!
//! # Preview a delete without touching anything
//! rtcontrol --delete -n 'completed=-1'
//!
//! # Paths for xargs
//! rtcontrol -0 -o realpath is_complete=yes | xargs -0 ls -d
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/rtcontrol/config.toml` on Linux (or
//! `--config-dir`) and `RTCONTROL_*` environment variables.

use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use rtcontrol::{
    ControlError,
    cli::{Cli, fields_help},
    config::ControlConfig,
    control::Controller,
    fields::FieldRegistry,
    filters,
    source::{SnapshotSource, SourceError},
    ui::{Confirmation, DialoguerPrompt},
};

type Result<T> = std::result::Result<T, ControlError>;

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(cli.log_level().into()))
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let registry = FieldRegistry::torrent();

    if cli.help_fields {
        Cli::full_command().print_help()?;
        println!();
        print!("{}", fields_help(&registry));
        return Ok(ExitCode::from(1));
    }

    let config = ControlConfig::load(cli.config_dir.as_deref())?;
    let options = cli.options().build(&config, &registry)?;
    let matcher = filters::parse_conditions(options.filters(), &registry)?;

    let source_path = cli
        .source
        .clone()
        .or_else(|| config.source.clone())
        .ok_or(SourceError::NotConfigured)?;
    let source = SnapshotSource::open(&source_path)?;

    let mut confirm = Confirmation::new(DialoguerPrompt::new())
        .interactive(options.interactive())
        .assume_yes(cli.yes);
    let summary = Controller::new(&options, &registry).run(&source, &matcher, &mut confirm, io::stdout().lock())?;

    Ok(if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(&cli);

    match run(&cli) {
        Ok(code) => code,
        Err(e) if e.is_usage() => {
            let kind = if matches!(e, ControlError::Action(_)) {
                ErrorKind::ArgumentConflict
            } else {
                ErrorKind::MissingRequiredArgument
            };
            Cli::full_command().error(kind, e).exit()
        }
        Err(e) => {
            tracing::debug!(error = ?e, "aborting");
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}
