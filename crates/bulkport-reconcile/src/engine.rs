//! The dry-run decision engine.
//!
//! For each validated row the engine derives a lookup key, consults the
//! caller-supplied entity population, and decides create/update/delete/skip
//! under the import options. Nothing is mutated; the same input may be
//! dry-run repeatedly against an unchanged snapshot with identical results.

use tracing::{debug, info};

use bulkport_model::{
    DryRunResult, DryRunSummary, EntityKind, FieldValue, ImportOptions, Operation, ParsedRow,
    Record, ReconciledChange, RowIssue, RowWarning,
};

use crate::diff::changed_fields;
use crate::store::{EntityStore, IdGenerator};

/// Failure while planning a single row. Captured per row; never aborts the
/// batch.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("row has no usable lookup key")]
    NoLookupKey,
}

/// Derive the lookup key for a record of the given kind.
///
/// Each kind has a primary key field; when it is absent the shared fallback
/// chain applies: name, title, id, then a canonical full-record rendering as
/// a last resort. Only a fully empty record has no key.
pub fn lookup_key(kind: EntityKind, record: &Record) -> Option<String> {
    let primary = match kind {
        EntityKind::Users => field_key(record, "email"),
        EntityKind::Customers => {
            field_key(record, "name").or_else(|| field_key(record, "email"))
        }
        EntityKind::Projects => field_key(record, "title"),
    };
    primary
        .or_else(|| field_key(record, "name"))
        .or_else(|| field_key(record, "title"))
        .or_else(|| field_key(record, "id"))
        .or_else(|| canonical_key(record))
}

fn field_key(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Null) | None => None,
        Some(value) => Some(value.to_string()),
    }
}

fn canonical_key(record: &Record) -> Option<String> {
    let rendered: Vec<String> = record
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(field, value)| format!("{field}={value}"))
        .collect();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join(";"))
    }
}

pub struct DryRunEngine<'a> {
    store: &'a dyn EntityStore,
    ids: &'a dyn IdGenerator,
}

impl<'a> DryRunEngine<'a> {
    pub fn new(store: &'a dyn EntityStore, ids: &'a dyn IdGenerator) -> Self {
        Self { store, ids }
    }

    /// Plan what would happen to each row if the import were executed.
    ///
    /// Rows are processed strictly in input order. Rows carrying validation
    /// errors go straight to the error list; planning failures for
    /// individual rows are captured the same way.
    pub fn perform_dry_run(
        &self,
        kind: EntityKind,
        rows: &[ParsedRow],
        options: &ImportOptions,
    ) -> DryRunResult {
        let mut changes = Vec::new();
        let mut summary = DryRunSummary::default();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for row in rows {
            for warning in &row.warnings {
                warnings.push(RowWarning {
                    line: row.line,
                    message: warning.clone(),
                    data: row.values.clone(),
                });
            }

            if !row.is_valid() {
                summary.errors += 1;
                errors.push(RowIssue {
                    line: row.line,
                    message: row.errors.join("; "),
                    data: row.values.clone(),
                });
                continue;
            }

            match self.plan_row(kind, row, options) {
                Ok(change) => {
                    debug!(line = row.line, operation = ?change.operation, "planned row");
                    summary.record(change.operation);
                    if change.operation == Operation::Skip
                        && let Some(reason) = &change.reason
                    {
                        warnings.push(RowWarning {
                            line: row.line,
                            message: reason.clone(),
                            data: row.values.clone(),
                        });
                    }
                    changes.push(change);
                }
                Err(error) => {
                    summary.errors += 1;
                    errors.push(RowIssue {
                        line: row.line,
                        message: error.to_string(),
                        data: row.values.clone(),
                    });
                }
            }
        }

        info!(
            %kind,
            creates = summary.creates,
            updates = summary.updates,
            deletes = summary.deletes,
            skips = summary.skips,
            errors = summary.errors,
            "dry run complete"
        );

        DryRunResult {
            changes,
            summary,
            errors,
            warnings,
        }
    }

    fn plan_row(
        &self,
        kind: EntityKind,
        row: &ParsedRow,
        options: &ImportOptions,
    ) -> Result<ReconciledChange, PlanError> {
        let key = lookup_key(kind, &row.values).ok_or(PlanError::NoLookupKey)?;
        let existing = self.store.find(kind, &key);

        // Delete mode short-circuits every other policy
        if options.delete_mode {
            return Ok(match existing {
                Some(entity) => ReconciledChange {
                    operation: Operation::Delete,
                    kind,
                    existing_id: Some(entity.id),
                    before: Some(entity.data),
                    after: None,
                    reason: None,
                },
                None => ReconciledChange {
                    operation: Operation::Skip,
                    kind,
                    existing_id: None,
                    before: None,
                    after: None,
                    reason: Some("not found for deletion".to_string()),
                },
            });
        }

        if let Some(entity) = existing {
            if options.skip_duplicates {
                return Ok(skip(kind, entity.id, entity.data, "duplicate"));
            }
            if options.update_existing {
                if changed_fields(&entity.data, &row.values) {
                    let mut merged = entity.data.clone();
                    for (field, value) in &row.values {
                        // an explicit null clears a stored value; a null for
                        // a field the entity never had is not materialized
                        if value.is_null() && !merged.contains_key(field) {
                            continue;
                        }
                        merged.insert(field.clone(), value.clone());
                    }
                    return Ok(ReconciledChange {
                        operation: Operation::Update,
                        kind,
                        existing_id: Some(entity.id),
                        before: Some(entity.data),
                        after: Some(merged),
                        reason: Some("data differs".to_string()),
                    });
                }
                return Ok(skip(kind, entity.id, entity.data, "no changes"));
            }
            return Ok(skip(
                kind,
                entity.id,
                entity.data,
                "duplicate found but updates disabled",
            ));
        }

        let mut after = row.values.clone();
        after.insert(
            "id".to_string(),
            FieldValue::Text(self.ids.next_id(kind)),
        );
        Ok(ReconciledChange {
            operation: Operation::Create,
            kind,
            existing_id: None,
            before: None,
            after: Some(after),
            reason: None,
        })
    }
}

fn skip(kind: EntityKind, id: String, before: Record, reason: &str) -> ReconciledChange {
    ReconciledChange {
        operation: Operation::Skip,
        kind,
        existing_id: Some(id),
        before: Some(before),
        after: None,
        reason: Some(reason.to_string()),
    }
}
