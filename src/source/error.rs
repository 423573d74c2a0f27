//! Error types for item sources

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching items or invoking their actions
#[derive(Debug, Error)]
pub enum SourceError {
    /// I/O error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot content is not valid
    #[error("Invalid snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot could not be encoded for writing
    #[error("Cannot write snapshot {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No source was configured
    #[error("No item source configured; pass --source or set 'source' in the config file")]
    NotConfigured,

    /// Item does not support the requested method
    #[error("Unsupported method '{method}' on {item}")]
    UnsupportedMethod { method: String, item: String },

    /// Method was called with the wrong arguments
    #[error("Invalid arguments {args:?} for '{method}'")]
    InvalidArguments { method: String, args: Vec<String> },

    /// Item vanished from the source since it was fetched
    #[error("Item {0} no longer exists")]
    Gone(String),
}
