use std::path::Path;

use crate::error::{Error, Result};

/// Read a whole script file, tolerating bad encoding.
///
/// Invalid UTF-8 sequences are dropped and line endings are normalized to `\n`.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize_newlines(&decode_lossy(&bytes)))
}

/// Decode `bytes` as UTF-8, keeping valid runs and discarding invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
