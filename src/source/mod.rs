//! Item sources
//!
//! An item source hands out a snapshot of all items known to the download
//! client. Items expose their fields for filtering, sorting and display,
//! and accept action method calls that change their state in the client.

pub mod error;
pub mod snapshot;

pub use error::SourceError;
pub use snapshot::{SnapshotItem, SnapshotSource, TorrentRecord};

use crate::fields::FieldProvider;

/// A candidate item
pub trait Item: FieldProvider {
    /// Name shown in confirmation prompts
    fn display_name(&self) -> String;

    /// Call an action method on the item
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the method is unknown or the call fails.
    fn invoke(&self, method: &str, args: &[String]) -> Result<(), SourceError>;
}

/// Supplier of candidate items
pub trait ItemSource {
    type Item: Item;

    /// All items, in the source's natural order
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the items cannot be fetched.
    fn items(&self) -> Result<Vec<Self::Item>, SourceError>;

    /// Persist the changes made by action calls
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the changes cannot be written.
    fn commit(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
