//! Dry-run plan types: per-row decisions, summary counts, field diffs.

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};
use crate::schema::EntityKind;

/// What would happen to one row if the import were executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Skip,
}

/// One planned change; produced for every error-free input row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledChange {
    pub operation: Operation,
    pub kind: EntityKind,
    /// Id of the matched existing entity, when one was found.
    pub existing_id: Option<String>,
    /// Snapshot of the existing entity before the change.
    pub before: Option<Record>,
    /// Data as it would be written.
    pub after: Option<Record>,
    pub reason: Option<String>,
}

/// A row that could not be planned: validation failure or planning failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
    pub data: Record,
}

/// A benign, explanatory note attached to a row (e.g. a skip reason).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowWarning {
    pub line: usize,
    pub message: String,
    pub data: Record,
}

/// Per-operation counts for a dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub skips: usize,
    pub errors: usize,
}

impl DryRunSummary {
    pub fn record(&mut self, operation: Operation) {
        match operation {
            Operation::Create => self.creates += 1,
            Operation::Update => self.updates += 1,
            Operation::Delete => self.deletes += 1,
            Operation::Skip => self.skips += 1,
        }
    }

    /// Total planned changes (error rows excluded).
    pub fn planned(&self) -> usize {
        self.creates + self.updates + self.deletes + self.skips
    }
}

/// Terminal artifact of a dry run. Plain data; ownership passes to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunResult {
    pub changes: Vec<ReconciledChange>,
    pub summary: DryRunSummary,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowWarning>,
}

/// Caller-supplied policy for a dry run. Immutable per invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Update existing entities whose incoming data differs.
    pub update_existing: bool,
    /// Skip rows that match an existing entity without comparing data.
    pub skip_duplicates: bool,
    /// Plan deletions instead of creations/updates.
    pub delete_mode: bool,
    /// Batch size for the (out-of-scope) execution step.
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            update_existing: false,
            skip_duplicates: false,
            delete_mode: false,
            batch_size: 100,
        }
    }
}

/// Heuristic execution forecast for a planned change list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEstimate {
    pub estimated_seconds: u64,
    pub batch_count: usize,
    /// Advisory only; never blocks execution.
    pub potential_issues: Vec<String>,
}

/// How a single field changed between two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Modified,
    Removed,
}

/// One entry of a structural record diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub old_value: Option<FieldValue>,
    pub new_value: Option<FieldValue>,
    pub kind: DiffKind,
}
