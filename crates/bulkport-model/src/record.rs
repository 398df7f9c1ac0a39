//! Typed field values and validated row data.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single validated field value.
///
/// Untagged so that records serialize as plain JSON objects, the same shape
/// the surrounding application stores entities in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text content, if this value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// A flat field-name to value map. `BTreeMap` keeps iteration deterministic,
/// which downstream diffing and rendering rely on.
pub type Record = BTreeMap<String, FieldValue>;

/// One validated input row. Created once by the parser, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedRow {
    /// 1-based line number in the source text (header included in the count).
    pub line: usize,
    /// Validated field values. Fields that failed validation are absent.
    pub values: Record,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParsedRow {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The parser's terminal artifact: all rows plus aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    /// Non-fatal file-level warnings, e.g. unknown headers.
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Rows that passed validation, in input order.
    pub fn valid(&self) -> impl Iterator<Item = &ParsedRow> {
        self.rows.iter().filter(|row| row.is_valid())
    }
}
