//! Error types for field lookups
//!
//! Raised when a field list or a field key names something the registry
//! does not know about.

use thiserror::Error;

/// Errors that can occur while validating field names
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// Field is not registered
    #[error("Unknown field name '{0}'")]
    UnknownField(String),

    /// Format specifier after a field name is not known
    #[error("Unknown format specification '{spec}' in '{key}'")]
    UnknownFormatSpec {
        /// The offending specifier
        spec: String,
        /// The full field key it appeared in
        key: String,
    },
}
