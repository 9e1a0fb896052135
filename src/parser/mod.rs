/// Line-level comment filter applied before statement splitting.
pub mod comments;
/// Setup/query partitioning of an annotated script.
pub mod extractor;
/// Query marker and phase marker recognition, plus the normalized query key.
pub mod markers;
/// Quote-aware statement boundary scanner.
pub mod splitter;

pub use extractor::{extract_setup_and_queries, ExtractedScript, QueryEntry};
pub use markers::QueryKey;
pub use splitter::split_statements;
