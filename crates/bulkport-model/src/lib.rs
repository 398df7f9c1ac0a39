pub mod plan;
pub mod record;
pub mod schema;

pub use plan::{
    DiffKind, DryRunResult, DryRunSummary, ExecutionEstimate, FieldDiff, ImportOptions,
    Operation, ReconciledChange, RowIssue, RowWarning,
};
pub use record::{FieldValue, ParseResult, ParsedRow, Record};
pub use schema::{EntityKind, FieldRule, FieldType, Schema, Transform};
