use std::path::{Component, Path};

use crate::error::{Error, Result};
use crate::parser::QueryKey;

/// Longest file stem derived from a label.
const MAX_STEM_CHARS: usize = 31;

/// Character substitutions applied to label-derived names.
const REPLACEMENTS: [(char, char); 7] = [
    ('/', '_'),
    ('\\', '_'),
    (':', ' '),
    ('*', ' '),
    ('?', ' '),
    ('[', '('),
    (']', ')'),
];

/// File stem for a query's result file.
///
/// Plain mode uses the key (`Q07`). Named mode uses `"{key}_{label}"` with
/// path-hostile characters replaced and cut to 31 characters.
pub fn file_stem(key: &QueryKey, label: &str, named: bool) -> String {
    let plain = key.to_string();
    if !named {
        return plain;
    }

    let stem: String = format!("{plain}_{label}")
        .chars()
        .map(|ch| {
            REPLACEMENTS
                .iter()
                .find(|(bad, _)| *bad == ch)
                .map_or(ch, |(_, good)| *good)
        })
        .filter(|ch| !ch.is_control())
        .take(MAX_STEM_CHARS)
        .collect();
    stem.trim_end_matches([' ', '.']).to_string()
}

/// Reject names that could escape the output directory.
pub fn validate_output_name(name: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidOutputName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(invalid("traversal segments are not allowed"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("path separators are not allowed"));
    }
    Ok(())
}
