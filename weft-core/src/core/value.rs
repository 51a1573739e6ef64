//! Cell values for untyped, user-supplied tabular data.
//!
//! Ingestion accepts anything a spreadsheet or CSV can hold, so a cell is a
//! closed variant rather than a dynamic value: `Null`, `Bool`, `Number`,
//! `Date`, or `Text`. Profiling and validation stay exhaustive over this
//! set, and the explicit coercion methods (`as_number`, `as_date`,
//! `as_bool_token`) are the only places where "looks like a number" logic
//! lives.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single table cell.
///
/// The untagged serde representation keeps the JSON shape natural for
/// export collaborators: `null`, booleans, and numbers serialize as
/// themselves, dates as ISO-8601 strings, everything else as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell. Always a finite double; ingestion maps NaN/inf to null.
    Number(f64),
    /// Date or date-time cell.
    Date(NaiveDateTime),
    /// Free text cell.
    Text(String),
}

/// Dynamic class of a non-blank cell, as used by type inference and
/// consistency scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueClass {
    Numeric,
    Date,
    Boolean,
    Text,
}

/// Date formats accepted when coercing text cells.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

impl Value {
    /// Converts a JSON value from the ingestion boundary into a cell.
    ///
    /// Arrays and objects are flattened to their JSON text; non-finite
    /// numbers become null.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => Value::Number(f),
                _ => Value::Null,
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// A blank cell is null or empty/whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerces the cell to a finite number, parsing text if necessary.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Some(f),
                _ => None,
            },
            _ => None,
        }
    }

    /// Coerces the cell to a date-time, trying the supported text formats.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_date_text(s.trim()),
            _ => None,
        }
    }

    /// Interprets the cell as a boolean token.
    ///
    /// Text follows the usual spreadsheet conventions: true/false, t/f,
    /// yes/no, y/n, 1/0, on/off (case-insensitive).
    pub fn as_bool_token(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" | "on" => Some(true),
                "false" | "f" | "no" | "n" | "0" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Dynamic class of the cell, or `None` when blank.
    ///
    /// Typed cells classify directly; text is coerced with the precedence
    /// date > boolean > numeric > text, so `"2023-12-25"` is a date and
    /// `"1"` is a boolean token rather than a number.
    pub fn classify(&self) -> Option<ValueClass> {
        if self.is_blank() {
            return None;
        }
        match self {
            Value::Number(_) => Some(ValueClass::Numeric),
            Value::Bool(_) => Some(ValueClass::Boolean),
            Value::Date(_) => Some(ValueClass::Date),
            Value::Text(_) => {
                if self.as_date().is_some() {
                    Some(ValueClass::Date)
                } else if self.as_bool_token().is_some() {
                    Some(ValueClass::Boolean)
                } else if self.as_number().is_some() {
                    Some(ValueClass::Numeric)
                } else {
                    Some(ValueClass::Text)
                }
            }
            Value::Null => None,
        }
    }

    /// Stable scalar rendering used for join keys, distinct-value sets, and
    /// the canonical row serialization behind duplicate detection.
    ///
    /// Text is trimmed so `" a "` and `"a"` compare equal everywhere the
    /// engine compares values.
    pub fn canonical_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Date(d) => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Value::Text(s) => s.trim().to_string(),
        }
    }
}

/// Renders a finite double without a trailing `.0` for whole values.
fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
