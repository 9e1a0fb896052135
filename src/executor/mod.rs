//! Statement execution. Every statement is independent: a failure is logged
//! and recorded, and the batch carries on with the next one.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::parser::{QueryEntry, QueryKey};

/// `rusqlite`-backed executor.
pub mod sqlite;

pub use sqlite::SqliteExecutor;

/// Longest statement prefix echoed to the log.
const ECHO_WIDTH: usize = 120;

/// Failure of a single statement.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Error reported by SQLite.
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Error reported by any other backend.
    #[error("{0}")]
    Backend(String),
}

/// Rows returned by one statement, rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    /// Column names in select-list order.
    pub columns: Vec<String>,
    /// Row values in column order.
    pub rows: Vec<Vec<String>>,
}

/// Something that can run one SQL statement at a time.
pub trait StatementExecutor {
    /// Execute `sql` and return its rows (empty for statements without a result).
    fn execute(&mut self, sql: &str) -> Result<ResultSet, ExecError>;
}

/// Counts from [`run_statements`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Statements that ran successfully.
    pub succeeded: usize,
    /// Statements that failed and were skipped.
    pub failed: usize,
}

/// The result of running one extracted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Normalized key of the query.
    pub key: QueryKey,
    /// Marker label.
    pub label: String,
    /// Executed SQL.
    pub sql: String,
    /// Rows, or the error message reported by the executor.
    pub result: Result<ResultSet, String>,
}

impl QueryOutcome {
    /// Number of rows returned, if the query succeeded.
    pub fn row_count(&self) -> Option<usize> {
        self.result.as_ref().ok().map(|rs| rs.rows.len())
    }

    /// Error message, if the query failed.
    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

/// Run `statements` in order, skipping blanks and carrying on past failures.
///
/// With `echo`, each statement is logged (truncated) before it runs.
pub fn run_statements<E>(executor: &mut E, statements: &[String], echo: bool) -> RunSummary
where
    E: StatementExecutor + ?Sized,
{
    let mut summary = RunSummary::default();

    for statement in statements {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        if echo {
            tracing::info!("-- Executing: {}", preview(sql));
        }
        match executor.execute(sql) {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping failed statement:\n{sql}");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Run every query in ascending key order, capturing rows or the error per query.
pub fn run_queries<E>(executor: &mut E, queries: &BTreeMap<QueryKey, QueryEntry>) -> Vec<QueryOutcome>
where
    E: StatementExecutor + ?Sized,
{
    tracing::info!("Executing {} queries", queries.len());

    queries
        .iter()
        .map(|(key, entry)| {
            tracing::info!("[{key}] {}", entry.label);
            let result = executor.execute(&entry.sql).map_err(|e| e.to_string());
            if let Err(e) = &result {
                tracing::warn!(%key, error = %e, "query failed");
            }
            QueryOutcome {
                key: key.clone(),
                label: entry.label.clone(),
                sql: entry.sql.clone(),
                result,
            }
        })
        .collect()
}

fn preview(sql: &str) -> String {
    let mut chars = sql.chars();
    let head: String = chars.by_ref().take(ECHO_WIDTH).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
