use std::path::PathBuf;

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while reading inputs, opening the database, or writing outputs.
///
/// Failures of individual statements are not errors at this level; see
/// [`crate::executor::ExecError`].
#[derive(Debug, Error)]
pub enum Error {
    /// An input file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The database could not be opened.
    #[error("Failed to open database '{path}': {source}")]
    OpenDatabase {
        /// Path given for the database.
        path: String,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A CSV record could not be encoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON manifest could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Excel workbook could not be built or saved.
    #[error("Failed to write workbook {}: {source}", .path.display())]
    Excel {
        /// Workbook that failed.
        path: PathBuf,
        /// Underlying workbook error.
        source: rust_xlsxwriter::XlsxError,
    },

    /// An output file name was rejected.
    #[error("Invalid output name '{name}': {reason}")]
    InvalidOutputName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
