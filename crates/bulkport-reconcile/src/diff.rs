//! Shallow record diffing.
//!
//! Two distinct comparisons live here on purpose. [`changed_fields`] drives
//! update planning and inspects only the fields the incoming row actually
//! provides, so a column the CSV never mentions does not trigger an update
//! (partial-update semantics). An explicitly empty cell does take part: it
//! arrives as [`FieldValue::Null`] and counts as a change when it would clear
//! a value the entity currently holds. [`generate_diff`] is the full
//! symmetric diff used to present an update to the operator.

use std::collections::BTreeSet;

use bulkport_model::{DiffKind, FieldDiff, Record};

/// True when any incoming field differs from the existing snapshot.
///
/// A null incoming value is a deliberate clear and differs from any non-null
/// existing value; clearing a field the entity never had is not a change.
pub fn changed_fields(existing: &Record, incoming: &Record) -> bool {
    incoming
        .iter()
        .any(|(field, value)| match existing.get(field) {
            Some(current) => current != value,
            None => !value.is_null(),
        })
}

/// Symmetric structural diff of two flat records.
///
/// A field present only in `before` is removed, only in `after` is added,
/// in both with unequal values is modified; equal values are omitted.
/// Output is ordered by field name.
pub fn generate_diff(before: &Record, after: &Record) -> Vec<FieldDiff> {
    let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut diffs = Vec::new();

    for field in fields {
        match (before.get(field), after.get(field)) {
            (Some(old), None) => diffs.push(FieldDiff {
                field: field.clone(),
                old_value: Some(old.clone()),
                new_value: None,
                kind: DiffKind::Removed,
            }),
            (None, Some(new)) => diffs.push(FieldDiff {
                field: field.clone(),
                old_value: None,
                new_value: Some(new.clone()),
                kind: DiffKind::Added,
            }),
            (Some(old), Some(new)) if old != new => diffs.push(FieldDiff {
                field: field.clone(),
                old_value: Some(old.clone()),
                new_value: Some(new.clone()),
                kind: DiffKind::Modified,
            }),
            _ => {}
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkport_model::FieldValue;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), FieldValue::Text((*v).to_string())))
            .collect()
    }

    #[test]
    fn equal_records_produce_no_diff() {
        let a = record(&[("role", "manager")]);
        assert!(generate_diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn diff_classifies_added_modified_removed() {
        let before = record(&[("role", "employee"), ("department", "sales")]);
        let after = record(&[("role", "manager"), ("phone", "555-0100")]);
        let diffs = generate_diff(&before, &after);
        assert_eq!(diffs.len(), 3);
        // BTreeSet ordering: department, phone, role
        assert_eq!(diffs[0].field, "department");
        assert_eq!(diffs[0].kind, DiffKind::Removed);
        assert_eq!(diffs[1].field, "phone");
        assert_eq!(diffs[1].kind, DiffKind::Added);
        assert_eq!(diffs[2].field, "role");
        assert_eq!(diffs[2].kind, DiffKind::Modified);
        assert_eq!(
            diffs[2].old_value,
            Some(FieldValue::Text("employee".to_string()))
        );
        assert_eq!(
            diffs[2].new_value,
            Some(FieldValue::Text("manager".to_string()))
        );
    }

    #[test]
    fn diff_is_symmetric_with_roles_swapped() {
        let before = record(&[("a", "1"), ("b", "2")]);
        let after = record(&[("b", "3"), ("c", "4")]);
        let forward = generate_diff(&before, &after);
        let backward = generate_diff(&after, &before);
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.field, b.field);
            assert_eq!(f.old_value, b.new_value);
            assert_eq!(f.new_value, b.old_value);
            let mirrored = match f.kind {
                DiffKind::Added => DiffKind::Removed,
                DiffKind::Removed => DiffKind::Added,
                DiffKind::Modified => DiffKind::Modified,
            };
            assert_eq!(b.kind, mirrored);
        }
    }

    #[test]
    fn changed_fields_ignores_fields_the_row_does_not_provide() {
        let existing = record(&[("role", "employee"), ("department", "sales")]);
        let incoming = record(&[("role", "employee")]);
        assert!(!changed_fields(&existing, &incoming));

        let differing = record(&[("role", "manager")]);
        assert!(changed_fields(&existing, &differing));
    }

    #[test]
    fn changed_fields_treats_an_explicit_null_as_a_clear() {
        let existing = record(&[("role", "employee"), ("department", "sales")]);

        // empty cell under a present column clears the stored value
        let mut clearing = record(&[("role", "employee")]);
        clearing.insert("department".to_string(), FieldValue::Null);
        assert!(changed_fields(&existing, &clearing));

        // clearing a field the entity never had is a no-op
        let mut noop = record(&[("role", "employee"), ("department", "sales")]);
        noop.insert("phone".to_string(), FieldValue::Null);
        assert!(!changed_fields(&existing, &noop));

        // null against an already-null stored value is equal
        let mut nulled = existing.clone();
        nulled.insert("department".to_string(), FieldValue::Null);
        assert!(!changed_fields(&nulled, &clearing));
    }
}
