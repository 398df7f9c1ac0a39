//! Library surface of the CLI crate: logging setup shared with the binary.

pub mod logging;
