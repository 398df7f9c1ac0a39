//! Line and field tokenization for comma-separated text.
//!
//! Fields are parsed by a small character state machine: a double quote
//! toggles quoted state, `""` inside quotes unescapes to a literal quote,
//! and a comma outside quotes terminates the field. Lines are split before
//! fields, so a line break inside a quoted field is not supported.

const UTF8_BOM: char = '\u{feff}';

/// A surviving input line with its original 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Split raw text into non-empty lines, handling both `\n` and `\r\n`.
///
/// Blank lines are dropped but still consume a line number, so reported
/// numbers match the source file.
pub fn split_lines(raw: &str) -> Vec<SourceLine<'_>> {
    raw.split('\n')
        .enumerate()
        .filter_map(|(idx, line)| {
            let text = line.strip_suffix('\r').unwrap_or(line);
            if text.trim().is_empty() {
                None
            } else {
                Some(SourceLine {
                    number: idx + 1,
                    text,
                })
            }
        })
        .collect()
}

/// Parse one line into fields.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Doubled quote is an escaped literal quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(current);
    fields
}

/// Serialize one field, quoting and escaping when needed.
///
/// Dual of [`parse_line`]: any value containing a comma or a quote survives
/// a serialize-then-parse round trip exactly.
pub fn quote_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Strip a UTF-8 BOM from the start of a header cell.
pub fn strip_bom(value: &str) -> &str {
    value.strip_prefix(UTF8_BOM).unwrap_or(value)
}
