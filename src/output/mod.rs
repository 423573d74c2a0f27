//! Per-item output
//!
//! The [`Emitter`] renders matched items with the compiled output format and
//! writes one record per item to the given writer. Records end in a newline,
//! or in a NUL byte with `--nul` so the output can be fed to `xargs -0`.

use std::collections::HashMap;
use std::io::Write;

use crate::fields::{FieldProvider, FieldRegistry};
use crate::format::OutputFormat;
use crate::ControlError;

/// Record terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Newline,
    Nul,
}

impl Terminator {
    #[must_use]
    pub const fn from_nul_flag(nul: bool) -> Self {
        if nul { Self::Nul } else { Self::Newline }
    }

    const fn byte(self) -> u8 {
        match self {
            Self::Newline => b'\n',
            Self::Nul => b'\0',
        }
    }
}

/// Writes rendered items
pub struct Emitter<'a, W: Write> {
    format: &'a OutputFormat,
    registry: &'a FieldRegistry,
    terminator: Terminator,
    out: W,
    count: usize,
}

impl<'a, W: Write> Emitter<'a, W> {
    pub const fn new(
        format: &'a OutputFormat,
        registry: &'a FieldRegistry,
        terminator: Terminator,
        out: W,
    ) -> Self {
        Self {
            format,
            registry,
            terminator,
            out,
            count: 0,
        }
    }

    /// Render `item` and write it with its terminator
    ///
    /// Fields missing from the item are looked up in `defaults`.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Format` if the item cannot be rendered and
    /// `ControlError::Io` if writing fails.
    pub fn emit(
        &mut self,
        item: &dyn FieldProvider,
        defaults: &HashMap<String, String>,
    ) -> Result<(), ControlError> {
        let text = self.format.render(self.registry, item, defaults)?;
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(&[self.terminator.byte()])?;
        if self.terminator == Terminator::Nul {
            self.out.flush()?;
        }
        self.count += 1;
        Ok(())
    }

    /// Number of records written
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Flush and hand back the writer
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Io` if flushing fails.
    pub fn finish(mut self) -> Result<W, ControlError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeItem;

    fn format(raw: &str) -> OutputFormat {
        OutputFormat::compile(Some(raw), "", &FieldRegistry::torrent())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_newline_records() {
        let registry = FieldRegistry::torrent();
        let format = format("name,ratio");
        let mut emitter = Emitter::new(&format, &registry, Terminator::Newline, Vec::new());

        emitter
            .emit(&FakeItem::new("a").with("ratio", 1.5), &HashMap::new())
            .unwrap();
        emitter
            .emit(&FakeItem::new("b").with("ratio", 2.0), &HashMap::new())
            .unwrap();
        assert_eq!(emitter.count(), 2);

        let out = emitter.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t1.5\nb\t2.0\n");
    }

    #[test]
    fn test_nul_records() {
        let registry = FieldRegistry::torrent();
        let format = format("name");
        let mut emitter = Emitter::new(&format, &registry, Terminator::from_nul_flag(true), Vec::new());

        emitter.emit(&FakeItem::new("a b"), &HashMap::new()).unwrap();
        emitter.emit(&FakeItem::new("c"), &HashMap::new()).unwrap();
        assert_eq!(emitter.finish().unwrap(), b"a b\0c\0");
    }

    #[test]
    fn test_defaults_and_percent() {
        let registry = FieldRegistry::torrent();
        let format = format("$(action)s $(done).0f$(pc)s");
        let mut defaults = HashMap::new();
        defaults.insert("action".to_string(), "START".to_string());

        let mut emitter = Emitter::new(&format, &registry, Terminator::Newline, Vec::new());
        emitter
            .emit(&FakeItem::new("x").with("done", 42.0), &defaults)
            .unwrap();
        assert_eq!(emitter.finish().unwrap(), b"START 42%\n");
    }

    #[test]
    fn test_render_error_writes_nothing() {
        let registry = FieldRegistry::torrent();
        let format = format("%(ratio)s");
        let mut emitter = Emitter::new(&format, &registry, Terminator::Newline, Vec::new());

        let err = emitter.emit(&FakeItem::new("x"), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ControlError::Format(_)));
        assert_eq!(emitter.count(), 0);
        assert!(emitter.finish().unwrap().is_empty());
    }
}
