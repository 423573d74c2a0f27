//! Field registry
//!
//! Every field an item can expose is registered here with its kind, a
//! description for `--help-fields`, and an optional default formatter used
//! when the field is displayed. Filters, sort keys and output formats all
//! validate their field names against the registry.
//!
//! # Examples
//!
//! ```
//! use rtcontrol::fields::FieldRegistry;
//!
//! let registry = FieldRegistry::torrent();
//! let fields = registry.validate("name,size.sz", true).unwrap();
//! assert_eq!(fields, vec!["name".to_string(), "size.sz".to_string()]);
//! assert!(registry.validate("name,bogus", false).is_err());
//! ```

pub mod error;
pub mod specs;
pub mod value;

pub use error::FieldError;
pub use specs::{FieldKey, FormatSpec};
pub use value::FieldValue;

use std::collections::BTreeMap;

/// Anything that can answer field lookups by name
pub trait FieldProvider {
    /// Value of the named field, or `None` if this provider lacks it
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Value domain of a field, used by filters to pick a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bytes,
    Bool,
    Timestamp,
}

impl FieldKind {
    /// Whether filter values compare numerically
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Bytes | Self::Timestamp)
    }
}

/// Default display transformation of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// Run a format specifier
    Spec(FormatSpec),
    /// Show one of two labels for a flag
    Flag {
        on: &'static str,
        off: &'static str,
    },
}

impl Formatter {
    /// Apply to a raw field value
    ///
    /// # Errors
    ///
    /// Propagates the specifier's message when the value has the wrong shape.
    pub fn apply(self, value: FieldValue) -> Result<FieldValue, String> {
        match self {
            Self::Spec(spec) => spec.apply(value),
            Self::Flag { on, off } => Ok(FieldValue::from(if value.as_bool() { on } else { off })),
        }
    }
}

/// Definition of one registered field
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub formatter: Option<Formatter>,
}

impl FieldDef {
    /// Define a field without a default formatter
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            formatter: None,
        }
    }

    /// Attach a default formatter
    #[must_use]
    pub const fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

/// Catalog of known fields, ordered by name
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<&'static str, FieldDef>,
}

impl FieldRegistry {
    /// Build a registry from field definitions
    #[must_use]
    pub fn new(defs: impl IntoIterator<Item = FieldDef>) -> Self {
        Self {
            fields: defs.into_iter().map(|def| (def.name, def)).collect(),
        }
    }

    /// Fields exposed by torrent items
    #[must_use]
    pub fn torrent() -> Self {
        use FieldKind::{Bool, Bytes, Float, Int, Text, Timestamp};

        let iso = Formatter::Spec(FormatSpec::Iso);

        Self::new([
            FieldDef::new("hash", Text, "info hash"),
            FieldDef::new("name", Text, "name (file or root directory)"),
            FieldDef::new("alias", Text, "tracker alias or domain"),
            FieldDef::new("tracker", Text, "first in the list of announce URLs"),
            FieldDef::new("size", Bytes, "data size"),
            FieldDef::new("done", Float, "completion in percent"),
            FieldDef::new("ratio", Float, "normalized ratio (1:1 = 1.0)"),
            FieldDef::new("up", Bytes, "upload rate"),
            FieldDef::new("down", Bytes, "download rate"),
            FieldDef::new("xfer", Bytes, "transfer rate"),
            FieldDef::new("prio", Int, "priority (0=off, 1=low, 2=normal, 3=high)"),
            FieldDef::new("is_open", Bool, "download open?")
                .with_formatter(Formatter::Flag { on: "OPN", off: "CLS" }),
            FieldDef::new("is_complete", Bool, "download complete?")
                .with_formatter(Formatter::Flag { on: "DONE", off: "PART" }),
            FieldDef::new("is_ignored", Bool, "ignore commands?")
                .with_formatter(Formatter::Flag { on: "IGN", off: "HEED" }),
            FieldDef::new("is_hashing", Bool, "hash check in progress?"),
            FieldDef::new("path", Text, "path to download data"),
            FieldDef::new("realpath", Text, "real path to download data"),
            FieldDef::new("loaded", Timestamp, "time metafile was loaded").with_formatter(iso),
            FieldDef::new("completed", Timestamp, "time download was finished").with_formatter(iso),
        ])
    }

    /// Look up a field definition
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Whether a field is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names with their descriptions, sorted by name
    pub fn all(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.fields.values().map(|def| (def.name, def.description))
    }

    /// Split a comma/space separated field list and validate every entry
    ///
    /// With `allow_format_specs`, entries may carry specifiers (`size.sz`).
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` naming the first unknown field or specifier.
    pub fn validate(&self, fields: &str, allow_format_specs: bool) -> Result<Vec<String>, FieldError> {
        let names: Vec<String> = fields
            .replace(',', " ")
            .split_whitespace()
            .map(str::to_string)
            .collect();

        for name in &names {
            let bare = if allow_format_specs && name.contains('.') {
                FieldKey::parse(name)?.name
            } else {
                name.clone()
            };
            if !self.contains(&bare) {
                return Err(FieldError::UnknownField(bare));
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_sorted() {
        let registry = FieldRegistry::torrent();
        let names: Vec<_> = registry.all().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"ratio"));
    }

    #[test]
    fn test_validate_splits_commas_and_spaces() {
        let registry = FieldRegistry::torrent();
        let fields = registry.validate("name, size ratio", false).unwrap();
        assert_eq!(fields, vec!["name", "size", "ratio"]);
    }

    #[test]
    fn test_validate_reports_first_unknown() {
        let registry = FieldRegistry::torrent();
        let err = registry.validate("name,nope,other", false).unwrap_err();
        assert_eq!(err, FieldError::UnknownField("nope".to_string()));
    }

    #[test]
    fn test_validate_format_specs_only_when_allowed() {
        let registry = FieldRegistry::torrent();
        assert!(registry.validate("size.sz", true).is_ok());
        assert_eq!(
            registry.validate("size.sz", false).unwrap_err(),
            FieldError::UnknownField("size.sz".to_string())
        );
        assert!(matches!(
            registry.validate("size.bogus", true),
            Err(FieldError::UnknownFormatSpec { .. })
        ));
    }

    #[test]
    fn test_flag_formatter() {
        let fmt = Formatter::Flag { on: "OPN", off: "CLS" };
        assert_eq!(fmt.apply(FieldValue::Bool(true)).unwrap().to_string(), "OPN");
        assert_eq!(fmt.apply(FieldValue::Bool(false)).unwrap().to_string(), "CLS");
    }
}
