/// Writes per-query CSV files, the Excel workbook, the JSON manifest, and the run report.
pub mod formatter;
/// Result file naming and output-name validation.
pub mod names;
/// Builds a Markdown run summary from the manifest.
pub mod report;
