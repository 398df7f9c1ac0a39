//! Declarative import schemas: one per entity kind, loaded once, immutable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds accepted by the import pipeline.
///
/// A closed enum rather than a free-form string so that adding a kind is a
/// compile-time-checked extension of every match below and in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Users,
    Customers,
    Projects,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] =
        [EntityKind::Users, EntityKind::Customers, EntityKind::Projects];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Customers => "customers",
            EntityKind::Projects => "projects",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag driving the per-field validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Date,
    Boolean,
}

/// String transform applied after a field validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Lowercase,
    Uppercase,
    Titlecase,
}

impl Transform {
    pub fn apply(self, value: &str) -> String {
        match self {
            Transform::Lowercase => value.to_lowercase(),
            Transform::Uppercase => value.to_uppercase(),
            Transform::Titlecase => value
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_uppercase().collect::<String>()
                                + &chars.as_str().to_lowercase()
                        }
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Validation rule for one field. A pure function of the raw string value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    pub required: bool,
    pub field_type: FieldType,
    /// Regex the trimmed raw value must match (checked after the type check).
    pub pattern: Option<String>,
    /// Lower bound: numeric value for `Number`, string length otherwise.
    pub min: Option<f64>,
    /// Upper bound: numeric value for `Number`, string length otherwise.
    pub max: Option<f64>,
    /// Enumerated allowed values (exact match on the trimmed raw value).
    pub allowed: Option<Vec<String>>,
    pub transform: Option<Transform>,
}

impl FieldRule {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            required: false,
            field_type,
            pattern: None,
            min: None,
            max: None,
            allowed: None,
            transform: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_allowed(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// Named rule set for one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub kind: EntityKind,
    /// Header names that must be present, in template order.
    pub required_fields: Vec<String>,
    pub optional_fields: Vec<String>,
    pub field_rules: Vec<FieldRule>,
}

impl Schema {
    /// Built-in schema for the given kind.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Users => Self::users(),
            EntityKind::Customers => Self::customers(),
            EntityKind::Projects => Self::projects(),
        }
    }

    /// True when `header` belongs to this schema.
    pub fn knows_field(&self, header: &str) -> bool {
        self.required_fields.iter().any(|f| f == header)
            || self.optional_fields.iter().any(|f| f == header)
    }

    pub fn users() -> Self {
        Self {
            kind: EntityKind::Users,
            required_fields: str_vec(&["email", "first_name", "last_name", "role"]),
            optional_fields: str_vec(&["department", "phone", "start_date", "salary", "active"]),
            field_rules: vec![
                FieldRule::new("email", FieldType::Email)
                    .required()
                    .with_transform(Transform::Lowercase),
                FieldRule::new("first_name", FieldType::Text)
                    .required()
                    .with_min(1.0)
                    .with_max(100.0),
                FieldRule::new("last_name", FieldType::Text)
                    .required()
                    .with_min(1.0)
                    .with_max(100.0),
                FieldRule::new("role", FieldType::Text)
                    .required()
                    .with_allowed(&["admin", "manager", "employee"])
                    .with_transform(Transform::Lowercase),
                FieldRule::new("department", FieldType::Text).with_max(100.0),
                FieldRule::new("phone", FieldType::Text)
                    .with_pattern(r"^\+?[0-9 ()\-]{7,20}$"),
                FieldRule::new("start_date", FieldType::Date),
                FieldRule::new("salary", FieldType::Number).with_min(0.0),
                FieldRule::new("active", FieldType::Boolean),
            ],
        }
    }

    pub fn customers() -> Self {
        Self {
            kind: EntityKind::Customers,
            required_fields: str_vec(&["name", "email"]),
            optional_fields: str_vec(&["phone", "company", "status", "notes"]),
            field_rules: vec![
                FieldRule::new("name", FieldType::Text)
                    .required()
                    .with_min(2.0)
                    .with_max(200.0),
                FieldRule::new("email", FieldType::Email)
                    .required()
                    .with_transform(Transform::Lowercase),
                FieldRule::new("phone", FieldType::Text)
                    .with_pattern(r"^\+?[0-9 ()\-]{7,20}$"),
                FieldRule::new("company", FieldType::Text).with_max(200.0),
                FieldRule::new("status", FieldType::Text)
                    .with_allowed(&["active", "inactive", "prospect"])
                    .with_transform(Transform::Lowercase),
                FieldRule::new("notes", FieldType::Text).with_max(1000.0),
            ],
        }
    }

    pub fn projects() -> Self {
        Self {
            kind: EntityKind::Projects,
            required_fields: str_vec(&["title", "status"]),
            optional_fields: str_vec(&[
                "description",
                "customer",
                "start_date",
                "end_date",
                "budget",
            ]),
            field_rules: vec![
                FieldRule::new("title", FieldType::Text)
                    .required()
                    .with_min(1.0)
                    .with_max(200.0),
                FieldRule::new("status", FieldType::Text)
                    .required()
                    .with_allowed(&["planned", "active", "on_hold", "completed"])
                    .with_transform(Transform::Lowercase),
                FieldRule::new("description", FieldType::Text).with_max(2000.0),
                FieldRule::new("customer", FieldType::Text).with_max(200.0),
                FieldRule::new("start_date", FieldType::Date),
                FieldRule::new("end_date", FieldType::Date),
                FieldRule::new("budget", FieldType::Number).with_min(0.0),
            ],
        }
    }
}

fn str_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
