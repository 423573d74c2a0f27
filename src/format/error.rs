//! Error types for output formats
//!
//! Compile errors are raised before any item is fetched; render errors are
//! raised while an item is being displayed.

use thiserror::Error;

use crate::fields::FieldError;

/// Errors that can occur while compiling or rendering an output format
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Field list or field key failed validation
    #[error(transparent)]
    Field(#[from] FieldError),

    /// `%(` without a closing parenthesis
    #[error("Unterminated placeholder at offset {0}")]
    Unterminated(usize),

    /// `%` not followed by `(` or `%`
    #[error("Incomplete format at offset {0}; use '%%' for a literal percent sign")]
    Incomplete(usize),

    /// Conversion character after a placeholder is not supported
    #[error("Unsupported conversion '{conversion}' for '{key}'")]
    Conversion { key: String, conversion: char },

    /// Placeholder names neither a field nor a default
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Registered field that the item does not provide
    #[error("Field '{0}' is not available for this item")]
    Missing(String),

    /// A formatter or numeric conversion rejected the value
    #[error("While formatting {key}={value:?}: {message}")]
    Value {
        key: String,
        value: String,
        message: String,
    },
}
