//! Split annotated SQL scripts into setup statements and labelled queries, run them, and export the results.
#![warn(missing_docs)]

/// Crate error type.
pub mod error;
/// Statement execution with per-statement failure tolerance.
pub mod executor;
/// CSV, workbook, manifest, and report output.
pub mod output;
/// Comment filtering, statement splitting, and query marker extraction.
pub mod parser;
/// Permissive script file reading.
pub mod source;
