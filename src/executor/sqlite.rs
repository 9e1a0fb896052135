use std::fmt::Write;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{ExecError, ResultSet, StatementExecutor};
use crate::error::{Error, Result};

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Runs statements against a SQLite database.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open (or create) the database at `path`; [`IN_MEMORY`] opens a throwaway one.
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        };
        let conn = conn.map_err(|source| Error::OpenDatabase {
            path: path.to_string(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }
}

impl StatementExecutor for SqliteExecutor {
    fn execute(&mut self, sql: &str) -> std::result::Result<ResultSet, ExecError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let rendered = (0..columns.len())
                .map(|idx| row.get_ref(idx).map(render_value))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            values.push(rendered);
        }

        Ok(ResultSet {
            columns,
            rows: values,
        })
    }
}

/// Render one SQLite value as text: NULL is empty, blobs are `\x`-prefixed hex.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => {
            let mut hex = String::with_capacity(2 + bytes.len() * 2);
            hex.push_str("\\x");
            for byte in bytes {
                write!(hex, "{byte:02x}").unwrap();
            }
            hex
        }
    }
}
