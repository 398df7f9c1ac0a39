//! Command implementations.

use std::fs;

use anyhow::{Context, Result};
use tracing::{info, trace};

use bulkport_cli::logging::redact_value;
use bulkport_ingest::{generate_template, parse};
use bulkport_model::{
    DryRunResult, EntityKind, ExecutionEstimate, ImportOptions, Schema,
};
use bulkport_reconcile::{DryRunEngine, InMemoryStore, UuidIds, estimate_execution_time};

use crate::cli::{DryRunArgs, TemplateArgs};

/// Everything the summary renderer needs from one dry run.
pub struct DryRunOutcome {
    pub kind: EntityKind,
    pub result: DryRunResult,
    pub estimate: ExecutionEstimate,
    /// File-level parse warnings (unknown headers and the like).
    pub parse_warnings: Vec<String>,
}

impl DryRunOutcome {
    pub fn has_errors(&self) -> bool {
        !self.result.errors.is_empty()
    }
}

pub fn run_dry_run(args: &DryRunArgs) -> Result<DryRunOutcome> {
    let kind: EntityKind = args.kind.into();
    let schema = Schema::for_kind(kind);

    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("read import file: {}", args.file.display()))?;
    let parsed = parse(&raw, &schema)
        .with_context(|| format!("parse import file: {}", args.file.display()))?;
    for row in parsed.rows.iter().filter(|row| !row.is_valid()) {
        let values = serde_json::to_string(&row.values).unwrap_or_default();
        trace!(line = row.line, values = redact_value(&values), "invalid row");
    }

    let mut store = InMemoryStore::new();
    if let Some(path) = &args.entities {
        let snapshot = fs::read_to_string(path)
            .with_context(|| format!("read entity snapshot: {}", path.display()))?;
        let loaded = store
            .load_json(kind, &snapshot)
            .with_context(|| format!("parse entity snapshot: {}", path.display()))?;
        info!(%kind, loaded, "loaded entity snapshot");
    }

    let options = ImportOptions {
        update_existing: args.update_existing,
        skip_duplicates: args.skip_duplicates,
        delete_mode: args.delete_mode,
        batch_size: args.batch_size,
    };

    let ids = UuidIds;
    let engine = DryRunEngine::new(&store, &ids);
    let result = engine.perform_dry_run(kind, &parsed.rows, &options);
    let estimate = estimate_execution_time(&result.changes);

    Ok(DryRunOutcome {
        kind,
        result,
        estimate,
        parse_warnings: parsed.warnings,
    })
}

pub fn run_template(args: &TemplateArgs) -> Result<()> {
    let schema = Schema::for_kind(args.kind.into());
    println!("{}", generate_template(&schema));
    Ok(())
}

pub fn run_schemas() -> Result<()> {
    for kind in EntityKind::ALL {
        let schema = Schema::for_kind(kind);
        println!(
            "{kind}: required [{}], optional [{}]",
            schema.required_fields.join(", "),
            schema.optional_fields.join(", ")
        );
    }
    Ok(())
}
