//! Terminal rendering of a dry-run outcome.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bulkport_model::{Operation, ReconciledChange};
use bulkport_reconcile::lookup_key;

use crate::commands::DryRunOutcome;

pub fn print_summary(outcome: &DryRunOutcome) {
    println!("Dry run: {}", outcome.kind);

    let summary = &outcome.result.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Create"),
        header_cell("Update"),
        header_cell("Delete"),
        header_cell("Skip"),
        header_cell("Errors"),
    ]);
    apply_style(&mut table);
    table.add_row(vec![
        count_cell(summary.creates, Color::Green),
        count_cell(summary.updates, Color::Yellow),
        count_cell(summary.deletes, Color::Red),
        Cell::new(summary.skips),
        count_cell(summary.errors, Color::Red),
    ]);
    println!("{table}");

    if !outcome.result.changes.is_empty() {
        print_changes(&outcome.result.changes);
    }

    for warning in &outcome.parse_warnings {
        println!("warning: {warning}");
    }
    for warning in &outcome.result.warnings {
        println!("warning: line {}: {}", warning.line, warning.message);
    }
    if !outcome.result.errors.is_empty() {
        eprintln!("Errors:");
        for issue in &outcome.result.errors {
            eprintln!("- line {}: {}", issue.line, issue.message);
        }
    }

    println!(
        "Estimated execution: ~{}s in {} batch(es)",
        outcome.estimate.estimated_seconds, outcome.estimate.batch_count
    );
    for issue in &outcome.estimate.potential_issues {
        println!("note: {issue}");
    }
}

fn print_changes(changes: &[ReconciledChange]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Operation"),
        header_cell("Key"),
        header_cell("Existing id"),
        header_cell("Reason"),
    ]);
    apply_style(&mut table);
    for change in changes {
        let key = change
            .after
            .as_ref()
            .or(change.before.as_ref())
            .and_then(|record| lookup_key(change.kind, record))
            .unwrap_or_default();
        table.add_row(vec![
            operation_cell(change.operation),
            Cell::new(key),
            Cell::new(change.existing_id.as_deref().unwrap_or("-")),
            Cell::new(change.reason.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}

fn apply_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count > 0 { cell.fg(color) } else { cell }
}

fn operation_cell(operation: Operation) -> Cell {
    match operation {
        Operation::Create => Cell::new("create").fg(Color::Green),
        Operation::Update => Cell::new("update").fg(Color::Yellow),
        Operation::Delete => Cell::new("delete").fg(Color::Red),
        Operation::Skip => Cell::new("skip"),
    }
}
