//! Literal escaping for SQL text interpolation.

use crate::value::SqlValue;

/// Turns a value into SQL text that is safe to splice into a statement
pub trait ValueEscaper {
    fn escape_item(&self, value: &SqlValue) -> String;
}

/// Escaping rules of the Databricks SQL connector
///
/// - `NULL` for nulls, bare text for numbers and booleans
/// - single-quoted strings with `\` and `'` backslash-escaped
/// - `'YYYY-MM-DD'` dates and `'YYYY-MM-DD HH:MM:SS.ffffff'` timestamps
/// - parenthesized, comma-joined sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamEscaper;

impl ParamEscaper {
    pub fn new() -> Self {
        Self
    }

    fn escape_string(s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    fn escape_float(f: f64) -> String {
        let text = f.to_string();
        if f.is_finite() && !text.contains('.') {
            format!("{text}.0")
        } else {
            text
        }
    }

    fn escape_sequence(&self, items: &[SqlValue]) -> String {
        let parts: Vec<String> = items.iter().map(|item| self.escape_item(item)).collect();
        format!("({})", parts.join(","))
    }
}

impl ValueEscaper for ParamEscaper {
    fn escape_item(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => Self::escape_float(*f),
            SqlValue::String(s) => Self::escape_string(s),
            SqlValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            SqlValue::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.6f")),
            SqlValue::List(items) => self.escape_sequence(items),
        }
    }
}
