//! rtcontrol - select torrents by filter conditions and act on them
//!
//! Torrents are fetched from an item source, filtered with `field=value`
//! conditions, sorted, and then either listed with a configurable output
//! format or handed to one of a small set of actions (start, stop, hash
//! check, delete, ignore).
//!
//! The pieces are usable on their own:
//!
//! - [`fields`]: field registry and typed field values
//! - [`filters`]: filter condition parsing and matching
//! - [`format`]: output format compilation and rendering
//! - [`actions`]: the action catalog and flag registration
//! - [`selection`]: matching and stable sorting
//! - [`control`]: option resolution and action dispatch

use thiserror::Error;

pub mod actions;
pub mod cli;
pub mod config;
pub mod control;
pub mod fields;
pub mod filters;
pub mod format;
pub mod output;
pub mod selection;
pub mod source;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum ControlError {
    /// Command line is unusable as given
    #[error("{0}")]
    Usage(String),
    /// More than one action was requested
    #[error(transparent)]
    Action(#[from] actions::ActionError),
    /// Unknown field in a sort or field list
    #[error(transparent)]
    Field(#[from] fields::FieldError),
    /// Output format failed to compile or render
    #[error(transparent)]
    Format(#[from] format::FormatError),
    /// Filter condition failed to parse
    #[error(transparent)]
    Filter(#[from] filters::FilterError),
    /// Item source failure
    #[error(transparent)]
    Source(#[from] source::SourceError),
    /// Confirmation prompt failure
    #[error("Prompt error: {0}")]
    Prompt(#[from] ui::PromptError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControlError {
    /// Whether the error should be reported with the usage message
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::Action(_))
    }

    /// Process exit status for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_usage() { 2 } else { 1 }
    }
}
