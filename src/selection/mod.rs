//! Selection and ordering of matched items
//!
//! [`select`] keeps the items accepted by a matcher, in source order,
//! together with the number of candidates. [`SortKey`] then orders the
//! matches by a list of fields. Sorting is stable in both directions: items
//! with equal keys stay in source order even when the order is reversed.

use crate::fields::{FieldError, FieldProvider, FieldRegistry, FieldValue};
use crate::filters::Matcher;

/// Items accepted by a matcher
#[derive(Debug)]
pub struct Selection<'a, I> {
    pub matches: Vec<&'a I>,
    pub total: usize,
}

impl<I> Selection<'_, I> {
    /// Number of matched items
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Keep the items `matcher` accepts, without touching `items`
pub fn select<'a, I: FieldProvider>(items: &'a [I], matcher: &dyn Matcher) -> Selection<'a, I> {
    Selection {
        matches: items.iter().filter(|item| matcher.matches(*item)).collect(),
        total: items.len(),
    }
}

/// Compiled `--sort-fields`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    fields: Vec<String>,
    reverse: bool,
}

impl SortKey {
    /// Validate a field list, falling back to `default` when none is given
    ///
    /// # Errors
    ///
    /// Returns `FieldError::UnknownField` for the first unknown field.
    pub fn compile(
        raw: Option<&str>,
        default: &str,
        reverse: bool,
        registry: &FieldRegistry,
    ) -> Result<Self, FieldError> {
        let fields = registry.validate(raw.unwrap_or(default), false)?;
        Ok(Self { fields, reverse })
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Tuple of an item's sort field values; missing fields sort first
    #[must_use]
    pub fn key(&self, item: &dyn FieldProvider) -> Vec<Option<FieldValue>> {
        self.fields.iter().map(|name| item.field(name)).collect()
    }

    /// Stable in-place sort of matched items
    pub fn sort<I: FieldProvider>(&self, items: &mut Vec<&I>) {
        let mut keyed: Vec<_> = items.drain(..).map(|item| (self.key(item), item)).collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = a.cmp(b);
            if self.reverse { ordering.reverse() } else { ordering }
        });
        items.extend(keyed.into_iter().map(|(_, item)| item));
    }
}
