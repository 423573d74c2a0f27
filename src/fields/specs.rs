//! Format specifiers
//!
//! A field key in an output format can carry a chain of specifiers, e.g.
//! `size.sz` or `completed.raw.delta`. Each specifier transforms the value
//! produced by the previous one.

use std::path::Path;
use std::time::UNIX_EPOCH;

use byte_unit::{Byte, UnitType};
use chrono::{Local, TimeZone, Utc};

use super::error::FieldError;
use super::value::FieldValue;

/// A named value transformation usable after a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSpec {
    Sz,
    Iso,
    Delta,
    Pc,
    Strip,
    Mtime,
    Pathbase,
    Pathname,
    Pathext,
    Pathdir,
}

/// Specifier that switches off a field's default formatter
pub const RAW: &str = "raw";

impl FormatSpec {
    /// All specifiers, in help order
    pub const ALL: [Self; 10] = [
        Self::Delta,
        Self::Iso,
        Self::Mtime,
        Self::Pathbase,
        Self::Pathdir,
        Self::Pathext,
        Self::Pathname,
        Self::Pc,
        Self::Strip,
        Self::Sz,
    ];

    /// Name used in field keys
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sz => "sz",
            Self::Iso => "iso",
            Self::Delta => "delta",
            Self::Pc => "pc",
            Self::Strip => "strip",
            Self::Mtime => "mtime",
            Self::Pathbase => "pathbase",
            Self::Pathname => "pathname",
            Self::Pathext => "pathext",
            Self::Pathdir => "pathdir",
        }
    }

    /// One-line description for `--help-fields`
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Sz => "Format a byte sized value.",
            Self::Iso => "Format a UNIX timestamp to an ISO datetime string.",
            Self::Delta => "Format a UNIX timestamp to a relative delta.",
            Self::Pc => "Scale a ratio value to percent.",
            Self::Strip => "Strip leading and trailing whitespace.",
            Self::Mtime => "Modification time of a path.",
            Self::Pathbase => "Base name of a path.",
            Self::Pathname => "Base name of a path, without its extension.",
            Self::Pathext => "Extension of a path (including the '.').",
            Self::Pathdir => "Directory containing the given path.",
        }
    }

    /// Look up a specifier by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|spec| spec.name() == name)
    }

    /// Apply the transformation
    ///
    /// # Errors
    ///
    /// Returns a message when the value has the wrong shape for this specifier.
    pub fn apply(self, value: FieldValue) -> Result<FieldValue, String> {
        match self {
            Self::Sz => {
                let bytes = value.as_f64().ok_or("not a number")?;
                Ok(FieldValue::Text(human_size(bytes)))
            }
            Self::Iso => {
                let ts = value.as_i64().ok_or("not a timestamp")?;
                Ok(FieldValue::Text(iso_datetime(ts)))
            }
            Self::Delta => {
                let ts = value.as_i64().ok_or("not a timestamp")?;
                Ok(FieldValue::Text(human_duration(Utc::now().timestamp() - ts)))
            }
            Self::Pc => {
                let ratio = value.as_f64().ok_or("not a number")?;
                Ok(FieldValue::Float((ratio * 10_000.0).round() / 100.0))
            }
            Self::Strip => Ok(FieldValue::Text(value.to_string().trim().to_string())),
            Self::Mtime => {
                let text = value.to_string();
                let modified = std::fs::metadata(&text)
                    .and_then(|meta| meta.modified())
                    .map_err(|e| e.to_string())?;
                let secs = modified
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| e.to_string())?
                    .as_secs();
                Ok(FieldValue::Int(i64::try_from(secs).map_err(|e| e.to_string())?))
            }
            Self::Pathbase => Ok(path_part(&value, Path::file_name)),
            Self::Pathname => Ok(path_part(&value, Path::file_stem)),
            Self::Pathext => {
                let text = value.to_string();
                let ext = Path::new(&text)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                Ok(FieldValue::Text(ext))
            }
            Self::Pathdir => {
                let text = value.to_string();
                let dir = Path::new(&text)
                    .parent()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(FieldValue::Text(dir))
            }
        }
    }
}

fn path_part(value: &FieldValue, part: impl Fn(&Path) -> Option<&std::ffi::OsStr>) -> FieldValue {
    let text = value.to_string();
    let piece = part(Path::new(&text))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    FieldValue::Text(piece)
}

/// Render a byte count with a binary unit, e.g. `1.5 GiB`
#[must_use]
pub fn human_size(bytes: f64) -> String {
    if bytes < 0.0 {
        return format!("-{}", human_size(-bytes));
    }
    let adjusted = Byte::from_u64(bytes as u64).get_appropriate_unit(UnitType::Binary);
    format!("{:.1} {}", adjusted.get_value(), adjusted.get_unit())
}

/// Render a UNIX timestamp in local time; zero means "never"
#[must_use]
pub fn iso_datetime(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "never".to_string();
    }
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map_or_else(|| timestamp.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Render an age in seconds using its two most significant units
#[must_use]
pub fn human_duration(seconds: i64) -> String {
    const UNITS: [(i64, &str); 5] = [(604_800, "w"), (86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    if seconds == 0 {
        return "just now".to_string();
    }
    let mut rest = seconds.abs();
    let mut parts = Vec::new();
    for (size, unit) in UNITS {
        if parts.len() == 2 {
            break;
        }
        if rest >= size || !parts.is_empty() {
            let count = rest / size;
            rest %= size;
            if count > 0 {
                parts.push(format!("{count}{unit}"));
            } else if !parts.is_empty() {
                // "1w", not "1w 0d"
                break;
            }
        }
    }
    let text = parts.join(" ");
    if seconds > 0 { format!("{text} ago") } else { format!("in {text}") }
}

/// A parsed field key such as `size.raw.sz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    /// Bare field name
    pub name: String,
    /// Whether the field's default formatter is switched off
    pub raw: bool,
    /// Specifiers applied in order
    pub specs: Vec<FormatSpec>,
}

impl FieldKey {
    /// Split a key into its field name and specifier chain
    ///
    /// # Errors
    ///
    /// Returns `FieldError::UnknownFormatSpec` for an unknown specifier.
    pub fn parse(key: &str) -> Result<Self, FieldError> {
        let mut parts = key.split('.');
        let name = parts.next().unwrap_or_default().to_string();
        let mut raw = false;
        let mut specs = Vec::new();

        for (i, part) in parts.enumerate() {
            if i == 0 && part == RAW {
                raw = true;
                continue;
            }
            let spec = FormatSpec::from_name(part).ok_or_else(|| FieldError::UnknownFormatSpec {
                spec: part.to_string(),
                key: key.to_string(),
            })?;
            specs.push(spec);
        }

        Ok(Self { name, raw, specs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_key() {
        let key = FieldKey::parse("name").unwrap();
        assert_eq!(key.name, "name");
        assert!(!key.raw);
        assert!(key.specs.is_empty());
    }

    #[test]
    fn test_parse_chained_key() {
        let key = FieldKey::parse("completed.raw.delta").unwrap();
        assert_eq!(key.name, "completed");
        assert!(key.raw);
        assert_eq!(key.specs, vec![FormatSpec::Delta]);
    }

    #[test]
    fn test_parse_unknown_spec() {
        let err = FieldKey::parse("size.huge").unwrap_err();
        assert_eq!(
            err,
            FieldError::UnknownFormatSpec {
                spec: "huge".to_string(),
                key: "size.huge".to_string()
            }
        );
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(1024.0), "1.0 KiB");
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(90_061), "1d 1h ago");
        assert_eq!(human_duration(-120), "in 2m");
        assert_eq!(human_duration(604_800), "1w ago");
        assert_eq!(human_duration(0), "just now");
    }

    #[test]
    fn test_percent() {
        let value = FormatSpec::Pc.apply(FieldValue::Float(0.12345)).unwrap();
        assert_eq!(value, FieldValue::Float(12.35));
    }

    #[test]
    fn test_path_parts() {
        let path = FieldValue::from("/data/movies/film.mkv");
        assert_eq!(FormatSpec::Pathbase.apply(path.clone()).unwrap().to_string(), "film.mkv");
        assert_eq!(FormatSpec::Pathname.apply(path.clone()).unwrap().to_string(), "film");
        assert_eq!(FormatSpec::Pathext.apply(path.clone()).unwrap().to_string(), ".mkv");
        assert_eq!(FormatSpec::Pathdir.apply(path).unwrap().to_string(), "/data/movies");
    }

    #[test]
    fn test_iso_never() {
        assert_eq!(iso_datetime(0), "never");
    }

    #[test]
    fn test_sz_rejects_text() {
        assert!(FormatSpec::Sz.apply(FieldValue::from("abc")).is_err());
    }
}
