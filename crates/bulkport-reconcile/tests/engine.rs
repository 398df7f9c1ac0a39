//! Decision-table and determinism tests for the dry-run engine.

use bulkport_ingest::parse;
use bulkport_model::{
    DiffKind, EntityKind, FieldValue, ImportOptions, Operation, ParsedRow, Record, Schema,
};
use bulkport_reconcile::{
    DryRunEngine, ExistingEntity, InMemoryStore, SequentialIds, generate_diff, lookup_key,
};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), FieldValue::Text((*v).to_string())))
        .collect()
}

fn row(line: usize, pairs: &[(&str, &str)]) -> ParsedRow {
    ParsedRow {
        line,
        values: record(pairs),
        errors: Vec::new(),
        warnings: Vec::new(),
    }
}

fn user_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.insert(
        EntityKind::Users,
        ExistingEntity {
            id: "u-100".to_string(),
            data: record(&[
                ("email", "john.doe@example.com"),
                ("first_name", "John"),
                ("last_name", "Doe"),
                ("role", "employee"),
            ]),
        },
    );
    store
}

#[test]
fn unmatched_row_plans_a_create_with_generated_id() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![row(
        2,
        &[
            ("email", "new@x.com"),
            ("first_name", "A"),
            ("last_name", "B"),
            ("role", "employee"),
        ],
    )];
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &ImportOptions::default());
    assert_eq!(result.summary.creates, 1);
    let change = &result.changes[0];
    assert_eq!(change.operation, Operation::Create);
    assert!(change.existing_id.is_none());
    let after = change.after.as_ref().unwrap();
    assert_eq!(after.get("id"), Some(&FieldValue::Text("users-1".to_string())));
    assert_eq!(
        after.get("email"),
        Some(&FieldValue::Text("new@x.com".to_string()))
    );
}

#[test]
fn duplicate_with_updates_disabled_skips() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![row(
        2,
        &[
            ("email", "john.doe@example.com"),
            ("first_name", "A"),
            ("last_name", "B"),
            ("role", "employee"),
        ],
    )];
    // update_existing=false, skip_duplicates=false
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &ImportOptions::default());
    assert_eq!(result.summary.skips, 1);
    let change = &result.changes[0];
    assert_eq!(change.operation, Operation::Skip);
    assert_eq!(
        change.reason.as_deref(),
        Some("duplicate found but updates disabled")
    );
    // benign reasons surface on the warning channel, never as errors
    assert_eq!(result.warnings.len(), 1);
    assert!(result.errors.is_empty());
}

#[test]
fn skip_duplicates_takes_precedence_over_update() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![row(2, &[("email", "john.doe@example.com"), ("role", "manager")])];
    let options = ImportOptions {
        skip_duplicates: true,
        update_existing: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &options);
    assert_eq!(result.changes[0].operation, Operation::Skip);
    assert_eq!(result.changes[0].reason.as_deref(), Some("duplicate"));
}

#[test]
fn differing_data_plans_an_update_with_diff() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![row(2, &[("email", "john.doe@example.com"), ("role", "manager")])];
    let options = ImportOptions {
        update_existing: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &options);
    assert_eq!(result.summary.updates, 1);
    let change = &result.changes[0];
    assert_eq!(change.operation, Operation::Update);
    assert_eq!(change.existing_id.as_deref(), Some("u-100"));
    assert_eq!(change.reason.as_deref(), Some("data differs"));

    let diffs = generate_diff(
        change.before.as_ref().unwrap(),
        change.after.as_ref().unwrap(),
    );
    let role = diffs.iter().find(|d| d.field == "role").unwrap();
    assert_eq!(role.kind, DiffKind::Modified);
    assert_eq!(role.old_value, Some(FieldValue::Text("employee".to_string())));
    assert_eq!(role.new_value, Some(FieldValue::Text("manager".to_string())));

    // merged "after" keeps fields the row did not provide
    assert_eq!(
        change.after.as_ref().unwrap().get("first_name"),
        Some(&FieldValue::Text("John".to_string()))
    );
}

#[test]
fn explicitly_empty_cell_plans_an_update_that_clears_the_value() {
    let mut store = user_store();
    store.insert(
        EntityKind::Users,
        ExistingEntity {
            id: "u-200".to_string(),
            data: record(&[
                ("email", "dana@example.com"),
                ("role", "employee"),
                ("department", "sales"),
            ]),
        },
    );
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);

    // empty department cell under a present column
    let text = "email,first_name,last_name,role,department\n\
                dana@example.com,Dana,Reed,employee,\n";
    let parsed = parse(text, &Schema::users()).unwrap();
    let options = ImportOptions {
        update_existing: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &parsed.rows, &options);

    assert_eq!(result.summary.updates, 1);
    let change = &result.changes[0];
    assert_eq!(change.operation, Operation::Update);
    let after = change.after.as_ref().unwrap();
    assert_eq!(after.get("department"), Some(&FieldValue::Null));

    let diffs = generate_diff(change.before.as_ref().unwrap(), after);
    let dept = diffs.iter().find(|d| d.field == "department").unwrap();
    assert_eq!(dept.kind, DiffKind::Modified);
    assert_eq!(dept.old_value, Some(FieldValue::Text("sales".to_string())));
    assert_eq!(dept.new_value, Some(FieldValue::Null));
}

#[test]
fn identical_data_skips_with_no_changes() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![row(2, &[("email", "john.doe@example.com"), ("role", "employee")])];
    let options = ImportOptions {
        update_existing: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &options);
    assert_eq!(result.changes[0].operation, Operation::Skip);
    assert_eq!(result.changes[0].reason.as_deref(), Some("no changes"));
}

#[test]
fn delete_mode_short_circuits_other_policy() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![
        row(2, &[("email", "john.doe@example.com")]),
        row(3, &[("email", "ghost@example.com")]),
    ];
    let options = ImportOptions {
        delete_mode: true,
        // ignored under delete mode
        update_existing: true,
        skip_duplicates: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &options);
    assert_eq!(result.summary.deletes, 1);
    assert_eq!(result.summary.skips, 1);

    let delete = &result.changes[0];
    assert_eq!(delete.operation, Operation::Delete);
    assert_eq!(delete.existing_id.as_deref(), Some("u-100"));
    assert_eq!(
        delete.before.as_ref().unwrap().get("role"),
        Some(&FieldValue::Text("employee".to_string()))
    );

    let skip = &result.changes[1];
    assert_eq!(skip.operation, Operation::Skip);
    assert_eq!(skip.reason.as_deref(), Some("not found for deletion"));
}

#[test]
fn error_rows_never_reach_the_decision_logic() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let mut bad = row(2, &[("first_name", "A")]);
    bad.errors.push("email is required".to_string());
    let rows = vec![
        bad,
        row(3, &[("email", "new@x.com"), ("role", "employee")]),
    ];
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &ImportOptions::default());
    assert_eq!(result.summary.errors, 1);
    assert_eq!(result.summary.creates, 1);
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 2);
    assert!(result.errors[0].message.contains("email"));
}

#[test]
fn empty_record_is_a_per_row_planning_error() {
    let store = InMemoryStore::new();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![ParsedRow {
        line: 2,
        values: Record::new(),
        errors: Vec::new(),
        warnings: Vec::new(),
    }];
    let result = engine.perform_dry_run(EntityKind::Users, &rows, &ImportOptions::default());
    assert_eq!(result.summary.errors, 1);
    assert!(result.errors[0].message.contains("lookup key"));
    assert!(result.changes.is_empty());
}

#[test]
fn dry_run_is_deterministic() {
    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let rows = vec![
        row(2, &[("email", "new@x.com"), ("role", "employee")]),
        row(3, &[("email", "john.doe@example.com"), ("role", "manager")]),
    ];
    let options = ImportOptions {
        update_existing: true,
        ..ImportOptions::default()
    };

    let ids_b = SequentialIds::default();
    let engine_b = DryRunEngine::new(&store, &ids_b);
    let first = engine.perform_dry_run(EntityKind::Users, &rows, &options);
    let second = engine_b.perform_dry_run(EntityKind::Users, &rows, &options);

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.changes.len(), second.changes.len());
    for (a, b) in first.changes.iter().zip(second.changes.iter()) {
        assert_eq!(a.operation, b.operation);
        assert_eq!(a.existing_id, b.existing_id);
        assert_eq!(a.before, b.before);
        assert_eq!(a.after, b.after);
        assert_eq!(a.reason, b.reason);
    }
}

#[test]
fn lookup_keys_follow_kind_specific_rules() {
    assert_eq!(
        lookup_key(EntityKind::Users, &record(&[("email", "a@b.com")])),
        Some("a@b.com".to_string())
    );
    assert_eq!(
        lookup_key(EntityKind::Customers, &record(&[("name", "Acme"), ("email", "x@y.com")])),
        Some("Acme".to_string())
    );
    assert_eq!(
        lookup_key(EntityKind::Customers, &record(&[("email", "x@y.com")])),
        Some("x@y.com".to_string())
    );
    assert_eq!(
        lookup_key(EntityKind::Projects, &record(&[("title", "Rollout")])),
        Some("Rollout".to_string())
    );
    // fallback chain: name, title, id, then the full-record rendering
    assert_eq!(
        lookup_key(EntityKind::Users, &record(&[("name", "Jane")])),
        Some("Jane".to_string())
    );
    assert_eq!(
        lookup_key(EntityKind::Users, &record(&[("id", "u-7")])),
        Some("u-7".to_string())
    );
    assert_eq!(
        lookup_key(EntityKind::Users, &record(&[("department", "ops")])),
        Some("department=ops".to_string())
    );
    assert_eq!(lookup_key(EntityKind::Users, &Record::new()), None);
}

#[test]
fn parse_then_dry_run_end_to_end() {
    let text = "email,first_name,last_name,role\n\
                JOHN.DOE@EXAMPLE.COM,John,Doe,manager\n\
                ,Missing,Email,employee\n\
                fresh@example.com,Fresh,Hire,employee\n";
    let parsed = parse(text, &Schema::users()).unwrap();
    assert_eq!(parsed.total_rows, 3);

    let store = user_store();
    let ids = SequentialIds::default();
    let engine = DryRunEngine::new(&store, &ids);
    let options = ImportOptions {
        update_existing: true,
        ..ImportOptions::default()
    };
    let result = engine.perform_dry_run(EntityKind::Users, &parsed.rows, &options);

    // lowercase transform makes the first row match the existing user
    assert_eq!(result.summary.updates, 1);
    assert_eq!(result.summary.errors, 1);
    assert_eq!(result.summary.creates, 1);
    assert_eq!(result.errors[0].line, 3);
}
