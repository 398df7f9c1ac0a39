//! Execution forecast for a planned change list. Pure and advisory.

use bulkport_model::{ExecutionEstimate, Operation, ReconciledChange};

/// Nominal per-change throughput assumption.
const SECONDS_PER_CHANGE: f64 = 0.05;

/// Fixed batch size assumed for the execution step.
const BATCH_SIZE: usize = 100;

/// Estimate how long executing the plan would take, plus heuristic
/// advisories. Issues never block execution.
pub fn estimate_execution_time(changes: &[ReconciledChange]) -> ExecutionEstimate {
    let count = changes.len();
    let updates = changes
        .iter()
        .filter(|change| change.operation == Operation::Update)
        .count();
    let deletes = changes
        .iter()
        .filter(|change| change.operation == Operation::Delete)
        .count();

    let mut potential_issues = Vec::new();
    if count > 1000 {
        potential_issues.push(format!("large import: {count} changes"));
    }
    if count > 0 && (updates as f64) / (count as f64) > 0.8 {
        potential_issues
            .push("more than 80% of changes are updates; verify the match key".to_string());
    }
    if deletes > 0 {
        potential_issues.push(format!("plan contains {deletes} deletion(s)"));
    }

    ExecutionEstimate {
        estimated_seconds: (count as f64 * SECONDS_PER_CHANGE).ceil() as u64,
        batch_count: count.div_ceil(BATCH_SIZE),
        potential_issues,
    }
}
