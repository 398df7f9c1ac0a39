//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use bulkport_model::EntityKind;

#[derive(Parser)]
#[command(
    name = "bulkport",
    version,
    about = "Bulk import dry-run tool",
    long_about = "Parse a delimited import file against a named schema and plan the\n\
                  create/update/delete/skip decisions against an existing entity\n\
                  population, without applying anything."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row values (emails, names) in trace logs; redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse an import file and plan changes without applying them.
    DryRun(DryRunArgs),

    /// Print an empty import template header for a schema.
    Template(TemplateArgs),

    /// List the built-in import schemas.
    Schemas,
}

#[derive(Parser)]
pub struct DryRunArgs {
    /// Path to the delimited import file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Entity kind the file imports.
    #[arg(long = "kind", value_enum)]
    pub kind: KindArg,

    /// JSON snapshot of existing entities (array of flat objects with an "id").
    #[arg(long = "entities", value_name = "PATH")]
    pub entities: Option<PathBuf>,

    /// Plan updates for matched entities whose data differs.
    #[arg(long = "update-existing")]
    pub update_existing: bool,

    /// Skip rows matching an existing entity without comparing data.
    #[arg(long = "skip-duplicates")]
    pub skip_duplicates: bool,

    /// Plan deletions for matched entities instead of creates/updates.
    #[arg(long = "delete")]
    pub delete_mode: bool,

    /// Batch size assumed for the later execution step.
    #[arg(long = "batch-size", default_value_t = 100)]
    pub batch_size: usize,

    /// Emit the full dry-run result as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct TemplateArgs {
    /// Entity kind to produce a template for.
    #[arg(long = "kind", value_enum)]
    pub kind: KindArg,
}

/// Entity kind choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Users,
    Customers,
    Projects,
}

impl From<KindArg> for EntityKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Users => EntityKind::Users,
            KindArg::Customers => EntityKind::Customers,
            KindArg::Projects => EntityKind::Projects,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
