//! JSON snapshot source
//!
//! Reads torrents from a JSON file holding an array of records, as exported
//! from a download client. Actions are applied to the in-memory snapshot and
//! written back with [`SnapshotSource::save`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::error::SourceError;
use super::{Item, ItemSource};
use crate::fields::{FieldProvider, FieldValue};

const fn normal_priority() -> i64 {
    2
}

/// One torrent as stored in a snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    pub hash: String,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub tracker: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub done: f64,
    #[serde(default)]
    pub ratio: f64,
    #[serde(default)]
    pub up: i64,
    #[serde(default)]
    pub down: i64,
    #[serde(default = "normal_priority")]
    pub prio: i64,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub is_ignored: bool,
    #[serde(default)]
    pub is_hashing: bool,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub realpath: String,
    #[serde(default)]
    pub loaded: i64,
    #[serde(default)]
    pub completed: i64,
}

impl TorrentRecord {
    /// Create a record with default values for everything but hash and name
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            alias: String::new(),
            tracker: String::new(),
            size: 0,
            done: 0.0,
            ratio: 0.0,
            up: 0,
            down: 0,
            prio: normal_priority(),
            is_open: false,
            is_complete: false,
            is_ignored: false,
            is_hashing: false,
            path: String::new(),
            realpath: String::new(),
            loaded: 0,
            completed: 0,
        }
    }
}

impl FieldProvider for TorrentRecord {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "hash" => self.hash.as_str().into(),
            "name" => self.name.as_str().into(),
            "alias" => self.alias.as_str().into(),
            "tracker" => self.tracker.as_str().into(),
            "size" => self.size.into(),
            "done" => self.done.into(),
            "ratio" => self.ratio.into(),
            "up" => self.up.into(),
            "down" => self.down.into(),
            "xfer" => self.up.saturating_add(self.down).into(),
            "prio" => self.prio.into(),
            "is_open" => self.is_open.into(),
            "is_complete" => self.is_complete.into(),
            "is_ignored" => self.is_ignored.into(),
            "is_hashing" => self.is_hashing.into(),
            "path" => self.path.as_str().into(),
            "realpath" => self.realpath.as_str().into(),
            "loaded" => self.loaded.into(),
            "completed" => self.completed.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Default)]
struct Store {
    records: Vec<TorrentRecord>,
    dirty: bool,
}

impl Store {
    fn apply(&mut self, hash: &str, method: &str, args: &[String]) -> Result<(), SourceError> {
        let index = self
            .records
            .iter()
            .position(|r| r.hash == hash)
            .ok_or_else(|| SourceError::Gone(hash.to_string()))?;

        match (method, args) {
            ("start", _) => self.records[index].is_open = true,
            ("stop", _) => self.records[index].is_open = false,
            ("hash_check", _) => self.records[index].is_hashing = true,
            ("delete", _) => {
                self.records.remove(index);
            }
            ("ignore", [flag]) if flag == "0" || flag == "1" => {
                self.records[index].is_ignored = flag == "1";
            }
            ("ignore", _) => {
                return Err(SourceError::InvalidArguments {
                    method: method.to_string(),
                    args: args.to_vec(),
                });
            }
            _ => {
                return Err(SourceError::UnsupportedMethod {
                    method: method.to_string(),
                    item: hash.to_string(),
                });
            }
        }

        tracing::debug!(hash, method, ?args, "applied to snapshot");
        self.dirty = true;
        Ok(())
    }
}

/// Item source backed by a JSON snapshot file
#[derive(Debug)]
pub struct SnapshotSource {
    path: PathBuf,
    store: Rc<RefCell<Store>>,
}

impl SnapshotSource {
    /// Load a snapshot file
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        let records: Vec<TorrentRecord> =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), count = records.len(), "loaded snapshot");
        Ok(Self::from_records(path, records))
    }

    /// Wrap records that will be saved to `path`
    #[must_use]
    pub fn from_records(path: impl Into<PathBuf>, records: Vec<TorrentRecord>) -> Self {
        Self {
            path: path.into(),
            store: Rc::new(RefCell::new(Store {
                records,
                dirty: false,
            })),
        }
    }

    /// Current state of all records
    #[must_use]
    pub fn records(&self) -> Vec<TorrentRecord> {
        self.store.borrow().records.clone()
    }

    /// Whether any action changed the snapshot
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.store.borrow().dirty
    }

    /// Write changes back to the snapshot file; a no-op when nothing changed
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the file cannot be written.
    pub fn save(&self) -> Result<(), SourceError> {
        let mut store = self.store.borrow_mut();
        if !store.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&store.records).map_err(|source| SourceError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        store.dirty = false;
        tracing::debug!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

impl ItemSource for SnapshotSource {
    type Item = SnapshotItem;

    fn items(&self) -> Result<Vec<SnapshotItem>, SourceError> {
        Ok(self
            .store
            .borrow()
            .records
            .iter()
            .map(|record| SnapshotItem {
                record: record.clone(),
                store: Rc::clone(&self.store),
            })
            .collect())
    }

    fn commit(&self) -> Result<(), SourceError> {
        self.save()
    }
}

/// A torrent fetched from a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotItem {
    record: TorrentRecord,
    store: Rc<RefCell<Store>>,
}

impl FieldProvider for SnapshotItem {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.record.field(name)
    }
}

impl Item for SnapshotItem {
    fn display_name(&self) -> String {
        self.record.name.clone()
    }

    fn invoke(&self, method: &str, args: &[String]) -> Result<(), SourceError> {
        self.store.borrow_mut().apply(&self.record.hash, method, args)
    }
}
