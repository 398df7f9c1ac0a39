pub mod parser;
pub mod rules;
pub mod tokenizer;

pub use parser::{IngestError, generate_template, parse};
pub use rules::CompiledRule;
pub use tokenizer::{SourceLine, parse_line, quote_field, split_lines, strip_bom};
