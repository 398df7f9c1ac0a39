//! Field rule evaluation.
//!
//! Check precedence per field: required-and-empty, empty-and-optional, type
//! check (numeric and date values return as soon as they parse), format
//! pattern, enum membership, string length bounds, transform. Required-ness
//! trumps emptiness-is-ok, and type coercion happens before the generic
//! string checks so numeric and date fields never face length constraints.
//!
//! Rules are compiled once per parse; a malformed format pattern is a schema
//! defect, not row data, and fails compilation instead of every row.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use bulkport_model::{FieldRule, FieldType, FieldValue};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A field rule with its format pattern compiled.
#[derive(Debug)]
pub struct CompiledRule<'a> {
    rule: &'a FieldRule,
    pattern: Option<Regex>,
}

impl<'a> CompiledRule<'a> {
    /// Compile a rule's format pattern.
    ///
    /// # Errors
    ///
    /// Returns a message naming the field when its pattern is not a valid
    /// regex.
    pub fn compile(rule: &'a FieldRule) -> Result<Self, String> {
        let pattern = match &rule.pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|_| {
                format!("{} has an invalid format pattern in its schema", rule.field)
            })?),
            None => None,
        };
        Ok(Self { rule, pattern })
    }

    pub fn field(&self) -> &str {
        &self.rule.field
    }

    /// Evaluate this rule against the raw string value for its field.
    ///
    /// Returns the typed value or a human-readable error message.
    pub fn evaluate(&self, raw: Option<&str>) -> Result<FieldValue, String> {
        let rule = self.rule;
        let trimmed = raw.map(str::trim).unwrap_or_default();

        if trimmed.is_empty() {
            if rule.required {
                return Err(format!("{} is required", rule.field));
            }
            return Ok(FieldValue::Null);
        }

        let typed = match rule.field_type {
            FieldType::Email => {
                if !EMAIL_RE.is_match(trimmed) {
                    return Err(format!("{} must be a valid email address", rule.field));
                }
                FieldValue::Text(trimmed.to_string())
            }
            FieldType::Number => {
                let value: f64 = trimmed
                    .parse()
                    .map_err(|_| format!("{} must be a number", rule.field))?;
                // "NaN" and "inf" parse as f64 but are not usable values
                if !value.is_finite() {
                    return Err(format!("{} must be a number", rule.field));
                }
                if let Some(min) = rule.min
                    && value < min
                {
                    return Err(format!("{} must be at least {min}", rule.field));
                }
                if let Some(max) = rule.max
                    && value > max
                {
                    return Err(format!("{} must be at most {max}", rule.field));
                }
                return Ok(FieldValue::Number(value));
            }
            FieldType::Date => {
                let date = parse_date(trimmed)
                    .ok_or_else(|| format!("{} must be a valid date", rule.field))?;
                return Ok(FieldValue::Date(date));
            }
            FieldType::Boolean => {
                let value = parse_boolean(trimmed)
                    .ok_or_else(|| format!("{} must be a boolean", rule.field))?;
                FieldValue::Boolean(value)
            }
            FieldType::Text => FieldValue::Text(trimmed.to_string()),
        };

        if let Some(pattern) = &self.pattern
            && !pattern.is_match(trimmed)
        {
            return Err(format!("{} has an invalid format", rule.field));
        }

        if let Some(allowed) = &rule.allowed
            && !allowed.iter().any(|value| value == trimmed)
        {
            return Err(format!(
                "{} must be one of: {}",
                rule.field,
                allowed.join(", ")
            ));
        }

        let length = trimmed.chars().count() as f64;
        if let Some(min) = rule.min
            && length < min
        {
            return Err(format!(
                "{} must be at least {min} characters",
                rule.field
            ));
        }
        if let Some(max) = rule.max
            && length > max
        {
            return Err(format!("{} must be at most {max} characters", rule.field));
        }

        // Transforms only make sense for textual values; parsed booleans pass
        // through unchanged.
        Ok(match typed {
            FieldValue::Text(text) => FieldValue::Text(match rule.transform {
                Some(transform) => transform.apply(&text),
                None => text,
            }),
            other => other,
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
