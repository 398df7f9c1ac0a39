//! Schema-driven parsing of raw delimited text into a [`ParseResult`].

use std::collections::BTreeMap;

use tracing::{debug, info};

use bulkport_model::{ParseResult, ParsedRow, Record, Schema};

use crate::rules::CompiledRule;
use crate::tokenizer::{parse_line, quote_field, split_lines, strip_bom};

/// Structural parse failures. These abort the whole parse; no partial
/// result is returned. Per-field failures instead accumulate on the row.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("input file is empty")]
    EmptyFile,

    #[error("required column '{field}' is missing from the header")]
    MissingHeader { field: String },

    #[error("{message}")]
    InvalidPattern { message: String },
}

/// Parse raw CSV text against a schema.
///
/// Every data line yields a [`ParsedRow`], valid or not, so callers can
/// report exactly which rows and fields failed.
///
/// # Errors
///
/// [`IngestError::EmptyFile`] when no non-blank lines remain,
/// [`IngestError::MissingHeader`] when a required column is absent from the
/// header line, and [`IngestError::InvalidPattern`] when a schema rule
/// carries a format pattern that does not compile. All are raised before any
/// row is processed.
pub fn parse(raw_text: &str, schema: &Schema) -> Result<ParseResult, IngestError> {
    let lines = split_lines(raw_text);
    let Some((header_line, data_lines)) = lines.split_first() else {
        return Err(IngestError::EmptyFile);
    };

    let headers: Vec<String> = parse_line(header_line.text)
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let header = if idx == 0 { strip_bom(header) } else { header };
            header.trim().to_string()
        })
        .collect();

    for field in &schema.required_fields {
        if !headers.contains(field) {
            return Err(IngestError::MissingHeader {
                field: field.clone(),
            });
        }
    }

    // Compile rule patterns once; a rule whose column is not in the file at
    // all is skipped, so its field never appears in the row record. An empty
    // cell under a present column is a different case and yields Null.
    let compiled: Vec<CompiledRule> = schema
        .field_rules
        .iter()
        .filter(|rule| headers.iter().any(|header| *header == rule.field))
        .map(CompiledRule::compile)
        .collect::<Result<_, _>>()
        .map_err(|message| IngestError::InvalidPattern { message })?;

    let mut warnings = Vec::new();
    let unknown: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|header| !schema.knows_field(header))
        .collect();
    if !unknown.is_empty() {
        warnings.push(format!("unknown headers ignored: {}", unknown.join(", ")));
    }

    let mut rows = Vec::with_capacity(data_lines.len());
    for line in data_lines {
        let values = parse_line(line.text);
        let mut row_warnings = Vec::new();
        if values.len() > headers.len() {
            row_warnings.push(format!(
                "row has {} values for {} columns; extras ignored",
                values.len(),
                headers.len()
            ));
        }

        let raw: BTreeMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
            .collect();

        let mut record = Record::new();
        let mut errors = Vec::new();
        for rule in &compiled {
            match rule.evaluate(raw.get(rule.field()).copied()) {
                Ok(value) => {
                    record.insert(rule.field().to_string(), value);
                }
                Err(message) => errors.push(message),
            }
        }

        if !errors.is_empty() {
            debug!(line = line.number, errors = errors.len(), "row failed validation");
        }

        rows.push(ParsedRow {
            line: line.number,
            values: record,
            errors,
            warnings: row_warnings,
        });
    }

    let total_rows = rows.len();
    let valid_rows = rows.iter().filter(|row| row.is_valid()).count();
    let error_rows = total_rows - valid_rows;
    info!(
        kind = %schema.kind,
        total_rows,
        valid_rows,
        error_rows,
        "parsed import file"
    );

    Ok(ParseResult {
        headers,
        rows,
        total_rows,
        valid_rows,
        error_rows,
        warnings,
    })
}

/// Header line for an empty importable file: required fields first, then
/// optional ones, quoted where needed.
pub fn generate_template(schema: &Schema) -> String {
    schema
        .required_fields
        .iter()
        .chain(schema.optional_fields.iter())
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(",")
}
