use std::path::{Path, PathBuf};

use rust_xlsxwriter::{RowNum, Workbook, Worksheet, XlsxError};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::executor::QueryOutcome;
use crate::output::names::{file_stem, validate_output_name};
use crate::output::report;

/// Name of the JSON manifest written next to the CSV files.
pub const MANIFEST_FILE: &str = "queries.json";
/// Name of the Markdown run report.
pub const REPORT_FILE: &str = "report.md";

/// How result files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Name CSV files after `{key}_{label}` instead of the bare key.
    pub named_files: bool,
}

/// One manifest row per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Normalized key, e.g. `Q07`.
    pub key: String,
    /// Marker label.
    pub label: String,
    /// Executed SQL.
    pub sql: String,
    /// CSV file written for this query, relative to the output directory.
    pub file: String,
    /// Rows returned, when the query succeeded.
    pub rows: Option<usize>,
    /// Error message, when the query failed.
    pub error: Option<String>,
}

/// Write one CSV per query plus the manifest and report into `output_dir`.
///
/// Returns the paths of the CSV files, in key order.
pub fn write_output(
    output_dir: &Path,
    outcomes: &[QueryOutcome],
    options: OutputOptions,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir).map_err(|source| Error::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let manifest = build_manifest(outcomes, options);
    let mut written = Vec::with_capacity(outcomes.len());

    for (outcome, entry) in outcomes.iter().zip(&manifest) {
        validate_output_name(&entry.file)?;
        let path = output_dir.join(&entry.file);
        write_file(&path, &format_csv(outcome)?)?;
        written.push(path);
    }

    let manifest_path = output_dir.join(MANIFEST_FILE);
    write_file(&manifest_path, &serde_json::to_string_pretty(&manifest)?)?;

    let report_path = output_dir.join(REPORT_FILE);
    write_file(&report_path, &report::build_report(&manifest))?;

    Ok(written)
}

/// Manifest rows for `outcomes`, in the same order.
pub fn build_manifest(outcomes: &[QueryOutcome], options: OutputOptions) -> Vec<ManifestEntry> {
    outcomes
        .iter()
        .map(|outcome| ManifestEntry {
            key: outcome.key.to_string(),
            label: outcome.label.clone(),
            sql: outcome.sql.clone(),
            file: format!(
                "{}.csv",
                file_stem(&outcome.key, &outcome.label, options.named_files)
            ),
            rows: outcome.row_count(),
            error: outcome.error().map(ToString::to_string),
        })
        .collect()
}

/// Render a query outcome as CSV.
///
/// Successful queries produce a header row and data rows. Failed queries
/// produce an `error,query` placeholder holding the message and the SQL.
pub fn format_csv(outcome: &QueryOutcome) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    match &outcome.result {
        Ok(rs) => {
            if !rs.columns.is_empty() {
                wtr.write_record(&rs.columns)?;
            }
            for row in &rs.rows {
                wtr.write_record(row)?;
            }
        }
        Err(message) => {
            wtr.write_record(["error", "query"])?;
            wtr.write_record([message.as_str(), outcome.sql.as_str()])?;
        }
    }

    let data = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Write every outcome to its own sheet of an `.xlsx` workbook at `path`.
///
/// Sheets hold the same cells as the CSV files. Returns the sheet names, in
/// the order of `outcomes`.
pub fn write_workbook(path: &Path, outcomes: &[QueryOutcome]) -> Result<Vec<String>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let excel = |source: XlsxError| Error::Excel {
        path: path.to_path_buf(),
        source,
    };
    let names = sheet_names(outcomes);
    let mut workbook = Workbook::new();

    for (outcome, name) in outcomes.iter().zip(&names) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(excel)?;
        write_sheet(sheet, outcome).map_err(excel)?;
    }
    workbook.save(path).map_err(excel)?;

    Ok(names)
}

/// Sheet name per outcome: the label-derived stem (`Q07_Q7 - Total votes`),
/// or the bare key when Excel would reject the stem.
pub fn sheet_names(outcomes: &[QueryOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| {
            let stem = file_stem(&outcome.key, &outcome.label, true);
            // Excel refuses names ending in an apostrophe.
            if stem.ends_with('\'') {
                outcome.key.to_string()
            } else {
                stem
            }
        })
        .collect()
}

fn write_sheet(sheet: &mut Worksheet, outcome: &QueryOutcome) -> std::result::Result<(), XlsxError> {
    match &outcome.result {
        Ok(rs) => {
            let mut row: RowNum = 0;
            if !rs.columns.is_empty() {
                sheet.write_row(row, 0, &rs.columns)?;
                row += 1;
            }
            for values in &rs.rows {
                sheet.write_row(row, 0, values)?;
                row += 1;
            }
        }
        Err(message) => {
            sheet.write_row(0, 0, ["error", "query"])?;
            sheet.write_row(1, 0, [message.as_str(), outcome.sql.as_str()])?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
