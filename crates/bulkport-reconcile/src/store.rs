//! Entity lookup and identifier generation seams.
//!
//! The engine never owns the entity population: callers hand it a read-only
//! [`EntityStore`] snapshot, and identifier generation is injected so tests
//! can supply deterministic ids.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bulkport_model::{EntityKind, FieldValue, Record};

use crate::engine::lookup_key;

/// An existing entity as the engine sees it: a stable id plus a flat snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingEntity {
    pub id: String,
    pub data: Record,
}

/// Read-only lookup into the existing population for one entity kind.
///
/// The snapshot behind an implementation must not change during a dry run,
/// or the decisions for that run become inconsistent.
pub trait EntityStore {
    fn find(&self, kind: EntityKind, key: &str) -> Option<ExistingEntity>;
}

/// Identifier source for planned creations.
pub trait IdGenerator {
    fn next_id(&self, kind: EntityKind) -> String;
}

/// Random v4 ids for real imports.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, _kind: EntityKind) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<kind>-<n>` ids for tests and dry-run previews.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, kind: EntityKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{kind}-{n}")
    }
}

/// Fixture-friendly store: entities indexed by the same lookup-key
/// derivation the engine uses.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: BTreeMap<EntityKind, BTreeMap<String, ExistingEntity>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, indexing it by its derived lookup key. Entities
    /// whose key cannot be derived (fully empty records) are ignored.
    pub fn insert(&mut self, kind: EntityKind, entity: ExistingEntity) {
        if let Some(key) = lookup_key(kind, &entity.data) {
            self.entities.entry(kind).or_default().insert(key, entity);
        }
    }

    /// Load a JSON snapshot: an array of flat objects, each with an `id`
    /// field; the remaining fields become the entity data.
    pub fn load_json(&mut self, kind: EntityKind, json: &str) -> serde_json::Result<usize> {
        let raw: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;
        let mut loaded = 0usize;
        for object in raw {
            let mut id = String::new();
            let mut data = Record::new();
            for (field, value) in object {
                if field == "id" {
                    if let serde_json::Value::String(s) = value {
                        id = s;
                    }
                } else {
                    data.insert(field, json_to_field_value(value));
                }
            }
            self.insert(kind, ExistingEntity { id, data });
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.entities.get(&kind).map_or(0, BTreeMap::len)
    }
}

impl EntityStore for InMemoryStore {
    fn find(&self, kind: EntityKind, key: &str) -> Option<ExistingEntity> {
        self.entities.get(&kind)?.get(key).cloned()
    }
}

/// Convert a JSON value into a typed field value. ISO date strings become
/// dates so they compare equal to parsed CSV dates.
fn json_to_field_value(value: serde_json::Value) -> FieldValue {
    match value {
        serde_json::Value::Null => FieldValue::Null,
        serde_json::Value::Bool(b) => FieldValue::Boolean(b),
        serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(date) => FieldValue::Date(date),
            Err(_) => FieldValue::Text(s),
        },
        // Nested structure is outside the flat-record model; keep the raw text
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_json_indexes_by_lookup_key() {
        let mut store = InMemoryStore::new();
        let loaded = store
            .load_json(
                EntityKind::Users,
                r#"[{"id":"u-1","email":"jane@example.com","role":"manager"}]"#,
            )
            .unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(store.len(EntityKind::Users), 1);
        let found = store.find(EntityKind::Users, "jane@example.com").unwrap();
        assert_eq!(found.id, "u-1");
        assert_eq!(
            found.data.get("role"),
            Some(&FieldValue::Text("manager".to_string()))
        );
        assert!(store.find(EntityKind::Users, "nobody@example.com").is_none());
    }

    #[test]
    fn json_dates_become_typed_dates() {
        let value = json_to_field_value(serde_json::Value::String("2024-03-01".to_string()));
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn sequential_ids_are_deterministic() {
        let ids = SequentialIds::default();
        assert_eq!(ids.next_id(EntityKind::Users), "users-1");
        assert_eq!(ids.next_id(EntityKind::Users), "users-2");
    }
}
