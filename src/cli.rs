//! Command-line interface definitions and parsing
//!
//! The static options are declared with clap's derive API; one flag per
//! catalog action is added at parse time by [`actions::register`].
//!
//! # Examples
//!
//! ```
//! use rtcontrol::cli::Cli;
//!
//! let cli = Cli::try_parse_from_args(["rtcontrol", "--start", "-n", "ratio=+1"]).unwrap();
//! assert_eq!(cli.actions, vec!["start".to_string()]);
//! assert!(cli.dry_run);
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::actions::{self, IgnoreValue};
use crate::control::{ControlOptions, ControlOptionsBuilder};
use crate::fields::specs::RAW;
use crate::fields::{FieldRegistry, FormatSpec};

const ABOUT: &str = "Control and inspect torrents selected by filter conditions";

const LONG_ABOUT: &str = "\
Control and inspect torrents selected by filter conditions.

Filter conditions take the form <field>=<value>, where the field defaults
to 'name'. Text values are glob patterns; numbers may be prefixed with '+'
(greater than) or '-' (less than). Several values separated by commas are
alternatives, and '!' negates a value.

Without an action the matched torrents are listed; with one, the action is
applied to each of them.";

/// rtcontrol command line
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rtcontrol")]
#[command(about = ABOUT, long_about = LONG_ABOUT)]
#[command(version)]
#[command(after_help = "Use --help-fields to list all fields and their description.")]
pub struct Cli {
    /// Filter conditions, e.g. 'ratio=+1' or 'alias=PUB,TEST'
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,

    /// List fields and format specifiers, then exit
    #[arg(long = "help-fields")]
    pub help_fields: bool,

    /// Don't commit changes, just tell what would happen
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Interactive mode (prompt before changing things)
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Answer all confirmation prompts with yes
    #[arg(long = "yes")]
    pub yes: bool,

    /// Use a NUL character instead of a linebreak after items
    #[arg(short = '0', long = "nul", visible_alias = "print0")]
    pub nul: bool,

    /// Specify display format; '-' disables item display
    #[arg(short = 'o', long = "output-format", value_name = "FORMAT", allow_hyphen_values = true)]
    pub output_format: Option<String>,

    /// Fields used for sorting
    #[arg(short = 's', long = "sort-fields", value_name = "FIELD[,...]")]
    pub sort_fields: Option<String>,

    /// Reverse the sort order
    #[arg(short = 'r', long = "reverse-sort")]
    pub reverse_sort: bool,

    /// Set 'ignore commands' status on torrent
    #[arg(long = "ignore", value_name = "0|1")]
    pub ignore: Option<IgnoreValue>,

    /// JSON snapshot file to read torrents from (overrides config)
    #[arg(long = "source", value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Directory holding config.toml
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,

    /// Log extra information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log debug messages
    #[arg(long = "debug")]
    pub debug: bool,

    /// Catalog actions requested on the command line
    #[arg(skip)]
    pub actions: Vec<String>,
}

impl Cli {
    /// The full command, including one flag per catalog action
    #[must_use]
    pub fn full_command() -> clap::Command {
        actions::register(Self::command())
    }

    /// Parse command-line arguments, exiting on error
    #[must_use]
    pub fn parse_args() -> Self {
        Self::try_parse_from_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse the given arguments
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments, `--help` and `--version`.
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::full_command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.actions = actions::selected(&matches);
        Ok(cli)
    }

    /// Hand the option values to a [`ControlOptionsBuilder`]
    #[must_use]
    pub fn options(&self) -> ControlOptionsBuilder {
        self.actions.iter().fold(
            ControlOptions::builder()
                .filters(self.filters.iter().cloned())
                .dry_run(self.dry_run)
                .nul(self.nul)
                .output_format(self.output_format.clone())
                .sort_fields(self.sort_fields.clone())
                .reverse_sort(self.reverse_sort)
                .ignore(self.ignore)
                .interactive(self.interactive),
            |builder, name| builder.action(name.clone()),
        )
    }

    /// Log level selected by `-q`, `-v` and `--debug`
    #[must_use]
    pub const fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose || self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Text printed after the help by `--help-fields`
#[must_use]
pub fn fields_help(registry: &FieldRegistry) -> String {
    let mut text = String::from("Fields are:\n");
    for (name, description) in registry.all() {
        text.push_str(&format!("  {name:<21} {description}\n"));
    }
    text.push_str("\nFormat specifiers are:\n");
    text.push_str(&format!("  {RAW:<21} Switch off the default field formatter.\n"));
    for spec in FormatSpec::ALL {
        text.push_str(&format!("  {:<21} {}\n", spec.name(), spec.description()));
    }
    text
}
