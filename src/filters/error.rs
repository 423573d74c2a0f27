//! Error types for filter conditions
//!
//! All of these are raised while parsing the command line, before any item
//! is fetched.

use thiserror::Error;

/// Errors that can occur while parsing filter conditions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Condition names an unregistered field
    #[error("Unknown field name '{0}' in filter condition")]
    UnknownField(String),

    /// Glob pattern could not be compiled
    #[error("Invalid glob pattern '{pattern}': {message}")]
    BadPattern { pattern: String, message: String },

    /// Numeric field compared against something that is not a number
    #[error("Bad numeric value '{value}' for field '{field}'")]
    BadNumber { field: String, value: String },

    /// Flag field compared against something that is not a flag
    #[error("Bad boolean value '{value}' for field '{field}' (use yes/no)")]
    BadFlag { field: String, value: String },
}
