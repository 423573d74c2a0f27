//! Output format compilation
//!
//! Turns the `--output-format` value (or a configured default) into a
//! [`Template`]. Three forms are accepted:
//!
//! - a plain field list such as `name,size.sz,ratio`, which becomes a
//!   tab-separated template,
//! - a full template using `%(field)s` or the shell-friendly `$(field)s`,
//! - the disable marker `-`, which turns off per-item display.
//!
//! Escape sequences `\\`, `\n`, `\t`, `\$` and `\ ` are understood so that
//! formats survive shells and config files.

pub mod error;
pub mod template;

pub use error::FormatError;
pub use template::Template;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::fields::{FieldProvider, FieldRegistry};

/// Output format value that disables per-item display
pub const DISABLED: &str = "-";

static FIELD_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[,._0-9a-zA-Z]+$").expect("field list pattern is valid"));

/// A compiled output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    text: String,
    template: Template,
}

impl OutputFormat {
    /// Compile a user-supplied format, falling back to `default`
    ///
    /// Returns `Ok(None)` when display is disabled, either through `-` or an
    /// empty format.
    ///
    /// # Errors
    ///
    /// Returns a `FormatError` for unknown fields in a plain field list and
    /// for malformed templates.
    pub fn compile(
        raw: Option<&str>,
        default: &str,
        registry: &FieldRegistry,
    ) -> Result<Option<Self>, FormatError> {
        let raw = raw.unwrap_or(default);
        if raw.is_empty() || raw == DISABLED {
            return Ok(None);
        }

        let text = unescape(&expand_field_list(raw, registry)?);
        let template = Template::parse(&text)?;
        Ok(Some(Self { text, template }))
    }

    /// Canonical template text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render an item with extra default values
    ///
    /// # Errors
    ///
    /// Returns a `FormatError` when a placeholder cannot be rendered.
    pub fn render(
        &self,
        registry: &FieldRegistry,
        item: &dyn FieldProvider,
        extra: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut defaults = extra.clone();
        defaults.entry("pc".to_string()).or_insert_with(|| "%".to_string());
        self.template.render(registry, item, &defaults)
    }
}

/// Expand `name,size,ratio` into `%(name)s\t%(size)s\t%(ratio)s`
///
/// Anything that is not a plain field list is returned unchanged.
///
/// # Errors
///
/// Returns `FormatError::Field` if the list names an unknown field.
pub fn expand_field_list(raw: &str, registry: &FieldRegistry) -> Result<String, FormatError> {
    if !FIELD_LIST.is_match(raw) {
        return Ok(raw.to_string());
    }
    let fields = registry.validate(raw, true)?;
    Ok(format!("%({})s", fields.join(")s\t%(")))
}

#[derive(Clone, Copy)]
enum Scan {
    Literal,
    Backslash,
    Dollar,
}

/// Resolve escape sequences and `$(` placeholder openers
///
/// Unknown escapes are kept as written.
#[must_use]
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut state = Scan::Literal;

    for c in raw.chars() {
        state = match (state, c) {
            (Scan::Literal, '\\') => Scan::Backslash,
            (Scan::Literal, '$') => Scan::Dollar,
            (Scan::Literal, _) => {
                out.push(c);
                Scan::Literal
            }
            (Scan::Backslash, _) => {
                match c {
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    '$' => out.push('$'),
                    ' ' => out.push(' '),
                    _ => {
                        out.push('\\');
                        out.push(c);
                    }
                }
                Scan::Literal
            }
            (Scan::Dollar, '(') => {
                out.push_str("%(");
                Scan::Literal
            }
            (Scan::Dollar, '$') => {
                out.push('$');
                Scan::Dollar
            }
            (Scan::Dollar, '\\') => {
                out.push('$');
                Scan::Backslash
            }
            (Scan::Dollar, _) => {
                out.push('$');
                out.push(c);
                Scan::Literal
            }
        };
    }

    match state {
        Scan::Literal => {}
        Scan::Backslash => out.push('\\'),
        Scan::Dollar => out.push('$'),
    }
    out
}
