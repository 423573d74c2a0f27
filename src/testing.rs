//! Testing utilities for rtcontrol
//!
//! In-memory items and sources that record the action calls made on them,
//! plus a log capture for asserting on user-facing log lines.
//!
//! Only available when compiled with `cfg(test)`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::fields::{FieldProvider, FieldValue};
use crate::source::{Item, ItemSource, SourceError};

/// One recorded action call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub item: String,
    pub method: String,
    pub args: Vec<String>,
}

type CallLog = Rc<RefCell<Vec<Invocation>>>;

/// Item with arbitrary fields
///
/// # Examples
/// ```ignore
/// let item = FakeItem::new("ubuntu.iso").with("ratio", 1.5);
/// assert_eq!(item.field("ratio"), Some(FieldValue::Float(1.5)));
/// ```
#[derive(Debug, Clone)]
pub struct FakeItem {
    name: String,
    fields: HashMap<String, FieldValue>,
    failing: Option<String>,
    calls: CallLog,
}

impl FakeItem {
    /// Create an item whose only field is `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), FieldValue::from(name.as_str()));
        Self {
            name,
            fields,
            failing: None,
            calls: CallLog::default(),
        }
    }

    /// Set a field
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Make calls of `method` fail
    #[must_use]
    pub fn failing(mut self, method: &str) -> Self {
        self.failing = Some(method.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FieldProvider for FakeItem {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).cloned()
    }
}

impl Item for FakeItem {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn invoke(&self, method: &str, args: &[String]) -> Result<(), SourceError> {
        if self.failing.as_deref() == Some(method) {
            return Err(SourceError::UnsupportedMethod {
                method: method.to_string(),
                item: self.name.clone(),
            });
        }
        self.calls.borrow_mut().push(Invocation {
            item: self.name.clone(),
            method: method.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

/// Source handing out fake items, all recording into one shared log
#[derive(Debug, Default)]
pub struct FakeSource {
    items: Vec<FakeItem>,
    calls: CallLog,
    commits: Cell<usize>,
}

impl FakeSource {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = FakeItem>) -> Self {
        let calls = CallLog::default();
        let items = items
            .into_iter()
            .map(|mut item| {
                item.calls = Rc::clone(&calls);
                item
            })
            .collect();
        Self {
            items,
            calls,
            commits: Cell::new(0),
        }
    }

    /// Every call made on any item, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// How often the source was committed
    pub fn commits(&self) -> usize {
        self.commits.get()
    }
}

impl ItemSource for FakeSource {
    type Item = FakeItem;

    fn items(&self) -> Result<Vec<FakeItem>, SourceError> {
        Ok(self.items.clone())
    }

    fn commit(&self) -> Result<(), SourceError> {
        self.commits.set(self.commits.get() + 1);
        Ok(())
    }
}

/// Shared buffer that log output is written into
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with an info-level subscriber and return what it logged
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
