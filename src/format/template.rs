//! Placeholder templates
//!
//! A canonical template is literal text with `%(key)<conversion>`
//! placeholders, where the conversion follows printf conventions:
//! optional flags (`-0+ #`), width, `.precision` and a conversion character.
//! `%%` stands for a literal percent sign.

use std::collections::HashMap;

use super::error::FormatError;
use crate::fields::{FieldKey, FieldProvider, FieldRegistry, FieldValue};

const CONVERSIONS: &str = "srdifFeEgGxX";

/// Parsed printf-style conversion of a placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub left: bool,
    pub zero: bool,
    pub plus: bool,
    pub space: bool,
    pub alternate: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub kind: char,
}

/// One field reference inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub key: FieldKey,
    pub source: String,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed template, ready to render items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a canonical template
    ///
    /// # Errors
    ///
    /// Returns a `FormatError` for malformed placeholders or unknown format
    /// specifiers. Field names are not checked here.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                Some((_, '%')) => literal.push('%'),
                Some((_, '(')) => {
                    let mut source = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ')')) => break,
                            Some((_, ch)) => source.push(ch),
                            None => return Err(FormatError::Unterminated(offset)),
                        }
                    }

                    let mut conversion = Conversion::default();
                    while let Some(&(_, flag)) = chars.peek() {
                        match flag {
                            '-' => conversion.left = true,
                            '0' => conversion.zero = true,
                            '+' => conversion.plus = true,
                            ' ' => conversion.space = true,
                            '#' => conversion.alternate = true,
                            _ => break,
                        }
                        chars.next();
                    }
                    conversion.width = take_number(&mut chars);
                    if chars.next_if(|&(_, ch)| ch == '.').is_some() {
                        conversion.precision = Some(take_number(&mut chars).unwrap_or(0));
                    }
                    conversion.kind = match chars.next() {
                        Some((_, kind)) if CONVERSIONS.contains(kind) => kind,
                        other => {
                            return Err(FormatError::Conversion {
                                key: source,
                                conversion: other.map_or(' ', |(_, ch)| ch),
                            });
                        }
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(Placeholder {
                        key: FieldKey::parse(&source)?,
                        source,
                        conversion,
                    }));
                }
                _ => return Err(FormatError::Incomplete(offset)),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Placeholders in template order
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(placeholder) => Some(placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Render an item
    ///
    /// Field values come from the item first and from `defaults` second.
    ///
    /// # Errors
    ///
    /// Returns a `FormatError` when a placeholder cannot be resolved or its
    /// value cannot be converted.
    pub fn render(
        &self,
        registry: &FieldRegistry,
        item: &dyn FieldProvider,
        defaults: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(placeholder) => {
                    let value = resolve(placeholder, registry, item, defaults)?;
                    out.push_str(&convert(placeholder, &value)?);
                }
            }
        }
        Ok(out)
    }
}

fn take_number<I>(chars: &mut std::iter::Peekable<I>) -> Option<usize>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut digits = String::new();
    while let Some((_, ch)) = chars.next_if(|(_, ch)| ch.is_ascii_digit()) {
        digits.push(ch);
    }
    digits.parse().ok()
}

fn resolve(
    placeholder: &Placeholder,
    registry: &FieldRegistry,
    item: &dyn FieldProvider,
    defaults: &HashMap<String, String>,
) -> Result<FieldValue, FormatError> {
    let key = &placeholder.key;
    let def = registry.get(&key.name);
    if def.is_none() && !defaults.contains_key(&key.name) {
        return Err(FormatError::UnknownField(key.name.clone()));
    }

    let mut value = item
        .field(&key.name)
        .or_else(|| defaults.get(&key.name).map(|v| FieldValue::from(v.as_str())))
        .ok_or_else(|| FormatError::Missing(key.name.clone()))?;

    let value_error = |value: &FieldValue, message: String| FormatError::Value {
        key: key.name.clone(),
        value: value.to_string(),
        message,
    };

    if let Some(formatter) = def.and_then(|def| def.formatter)
        && !key.raw
    {
        value = formatter.apply(value.clone()).map_err(|m| value_error(&value, m))?;
    }
    for spec in &key.specs {
        value = spec.apply(value.clone()).map_err(|m| value_error(&value, m))?;
    }
    Ok(value)
}

fn convert(placeholder: &Placeholder, value: &FieldValue) -> Result<String, FormatError> {
    let conv = &placeholder.conversion;
    let not_a_number = || FormatError::Value {
        key: placeholder.source.clone(),
        value: value.to_string(),
        message: format!("%{} format requires a number", conv.kind),
    };

    let (body, numeric) = match conv.kind {
        'd' | 'i' => (signed(conv, value.as_i64().ok_or_else(not_a_number)?.to_string()), true),
        'x' | 'X' => {
            let n = value.as_i64().ok_or_else(not_a_number)?;
            let mut hex = format!("{:x}", n.unsigned_abs());
            if conv.alternate {
                hex.insert_str(0, "0x");
            }
            if conv.kind == 'X' {
                hex = hex.to_uppercase();
            }
            if n < 0 {
                hex.insert(0, '-');
            }
            (signed(conv, hex), true)
        }
        'f' | 'F' => {
            let f = value.as_f64().ok_or_else(not_a_number)?;
            (signed(conv, format!("{:.*}", conv.precision.unwrap_or(6), f)), true)
        }
        'e' | 'E' => {
            let f = value.as_f64().ok_or_else(not_a_number)?;
            let mut text = exponent(f, conv.precision.unwrap_or(6));
            if conv.kind == 'E' {
                text = text.to_uppercase();
            }
            (signed(conv, text), true)
        }
        'g' | 'G' => {
            let f = value.as_f64().ok_or_else(not_a_number)?;
            let mut text = general(f, conv.precision.unwrap_or(6), conv.alternate);
            if conv.kind == 'G' {
                text = text.to_uppercase();
            }
            (signed(conv, text), true)
        }
        _ => {
            let text = value.to_string();
            let text = match conv.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            (text, false)
        }
    };

    Ok(pad(conv, body, numeric))
}

fn signed(conv: &Conversion, text: String) -> String {
    if text.starts_with('-') {
        text
    } else if conv.plus {
        format!("+{text}")
    } else if conv.space {
        format!(" {text}")
    } else {
        text
    }
}

/// C-style exponent notation: `1.500000e+03`
fn exponent(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$e}");
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = exp.strip_prefix('-').map_or(("+", exp), |d| ("-", d));
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// C-style `%g`: fixed or exponent notation, whichever suits the magnitude
fn general(value: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    if !value.is_finite() {
        return value.to_string();
    }
    let sci = format!("{:.*e}", precision - 1, value);
    let exp: i32 = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    let digits = i32::try_from(precision).unwrap_or(i32::MAX);

    let text = if (-4..digits).contains(&exp) {
        let decimals = usize::try_from(digits - 1 - exp).unwrap_or(0);
        format!("{value:.decimals$}")
    } else {
        exponent(value, precision - 1)
    };
    if alternate {
        return text;
    }

    let (mantissa, exp) = text.split_at(text.find('e').unwrap_or(text.len()));
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{exp}")
}

fn pad(conv: &Conversion, body: String, numeric: bool) -> String {
    let Some(width) = conv.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    if conv.left {
        format!("{body}{}", " ".repeat(fill))
    } else if conv.zero && numeric {
        let split = usize::from(body.starts_with(['+', '-', ' ']));
        let (sign, digits) = body.split_at(split);
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}
