//! Filter conditions
//!
//! Filter conditions are given as `<field>=<value>` tokens, and all of them
//! must be met (AND). If the field name is omitted, `name` is assumed.
//!
//! - Text fields take glob patterns (`*`, `?`, `[a-z]`, `[!a-z]`), matched
//!   without regard to case.
//! - Numeric fields take a number; a leading `+` means greater than, a
//!   leading `-` means less than. Byte fields accept `k`, `m`, `g` and `t`
//!   suffixes.
//! - Flag fields take `yes`/`no` (or `true`/`false`, `1`/`0`).
//!
//! Several values separated by commas are alternatives (OR), and `!` in
//! front of a value negates it.
//!
//! # Examples
//!
//! ```
//! use rtcontrol::fields::FieldRegistry;
//! use rtcontrol::filters::parse_conditions;
//!
//! let registry = FieldRegistry::torrent();
//! let matcher = parse_conditions(&["ratio=+1".into(), "realpath=!/mnt/*".into()], &registry);
//! assert!(matcher.is_ok());
//! assert!(parse_conditions(&["nope=1".into()], &registry).is_err());
//! ```

pub mod error;

pub use error::FilterError;

use std::cmp::Ordering;

use glob::{MatchOptions, Pattern as GlobPattern};

use crate::fields::{FieldKind, FieldProvider, FieldRegistry, FieldValue};

/// Field tested when a condition has no `field=` prefix
pub const DEFAULT_FIELD: &str = "name";

/// Predicate over items
pub trait Matcher {
    /// Whether the item satisfies the predicate
    fn matches(&self, item: &dyn FieldProvider) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&dyn FieldProvider) -> bool,
{
    fn matches(&self, item: &dyn FieldProvider) -> bool {
        self(item)
    }
}

#[derive(Debug, Clone)]
enum Test {
    Glob(GlobPattern),
    Compare(Ordering, f64),
    Flag(bool),
}

impl Test {
    fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Self::Glob(pattern) => {
                let options = MatchOptions {
                    case_sensitive: false,
                    ..MatchOptions::default()
                };
                pattern.matches_with(&value.to_string(), options)
            }
            Self::Compare(ordering, number) => value
                .as_f64()
                .and_then(|v| v.partial_cmp(number))
                .is_some_and(|found| found == *ordering),
            Self::Flag(flag) => value.as_bool() == *flag,
        }
    }
}

#[derive(Debug, Clone)]
struct Alternative {
    negate: bool,
    test: Test,
}

/// One `field=value[,value...]` condition
#[derive(Debug, Clone)]
pub struct Condition {
    field: String,
    alternatives: Vec<Alternative>,
}

impl Condition {
    /// Parse a single token
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` for unknown fields or malformed values.
    pub fn parse(token: &str, registry: &FieldRegistry) -> Result<Self, FilterError> {
        let (field, values) = token.split_once('=').unwrap_or((DEFAULT_FIELD, token));
        let def = registry
            .get(field)
            .ok_or_else(|| FilterError::UnknownField(field.to_string()))?;

        let alternatives = values
            .split(',')
            .map(|value| {
                let (negate, value) = value.strip_prefix('!').map_or((false, value), |v| (true, v));
                let test = parse_test(field, def.kind, value)?;
                Ok(Alternative { negate, test })
            })
            .collect::<Result<Vec<_>, FilterError>>()?;

        Ok(Self {
            field: field.to_string(),
            alternatives,
        })
    }
}

impl Matcher for Condition {
    fn matches(&self, item: &dyn FieldProvider) -> bool {
        let value = item.field(&self.field);
        self.alternatives.iter().any(|alt| {
            let hit = value.as_ref().is_some_and(|v| alt.test.matches(v));
            hit != alt.negate
        })
    }
}

/// Conditions that must all hold
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl Matcher for ConditionSet {
    fn matches(&self, item: &dyn FieldProvider) -> bool {
        self.conditions.iter().all(|condition| condition.matches(item))
    }
}

/// Parse filter tokens into a matcher
///
/// # Errors
///
/// Returns the first `FilterError` encountered.
pub fn parse_conditions(tokens: &[String], registry: &FieldRegistry) -> Result<ConditionSet, FilterError> {
    let conditions = tokens
        .iter()
        .map(|token| Condition::parse(token, registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConditionSet { conditions })
}

fn parse_test(field: &str, kind: FieldKind, value: &str) -> Result<Test, FilterError> {
    if kind == FieldKind::Bool {
        return match value.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" | "on" => Ok(Test::Flag(true)),
            "no" | "false" | "0" | "off" => Ok(Test::Flag(false)),
            _ => Err(FilterError::BadFlag {
                field: field.to_string(),
                value: value.to_string(),
            }),
        };
    }

    if kind.is_numeric() {
        let (ordering, number) = match value.as_bytes().first() {
            Some(b'+') => (Ordering::Greater, &value[1..]),
            Some(b'-') => (Ordering::Less, &value[1..]),
            _ => (Ordering::Equal, value),
        };
        let number = parse_number(number, kind == FieldKind::Bytes).ok_or_else(|| FilterError::BadNumber {
            field: field.to_string(),
            value: value.to_string(),
        })?;
        return Ok(Test::Compare(ordering, number));
    }

    GlobPattern::new(value)
        .map(Test::Glob)
        .map_err(|e| FilterError::BadPattern {
            pattern: value.to_string(),
            message: e.to_string(),
        })
}

fn parse_number(text: &str, allow_units: bool) -> Option<f64> {
    let lower = text.trim().to_ascii_lowercase();
    let (digits, scale) = match lower.chars().last() {
        Some(unit @ ('k' | 'm' | 'g' | 't')) if allow_units => {
            let exp = "kmgt".find(unit)? as i32 + 1;
            (&lower[..lower.len() - 1], 1024_f64.powi(exp))
        }
        _ => (lower.as_str(), 1.0),
    };
    digits.parse::<f64>().ok().map(|n| n * scale)
}
