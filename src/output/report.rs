use std::fmt::Write;

use crate::output::formatter::ManifestEntry;

/// Build a Markdown summary of a query run.
pub fn build_report(entries: &[ManifestEntry]) -> String {
    let mut report = String::new();

    writeln!(report, "# sqlmark Run Report").unwrap();
    writeln!(report).unwrap();

    let failed: Vec<&ManifestEntry> = entries.iter().filter(|e| e.error.is_some()).collect();
    writeln!(
        report,
        "{} queries, {} succeeded, {} failed.",
        entries.len(),
        entries.len() - failed.len(),
        failed.len()
    )
    .unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Queries").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| Key | Label | Rows | Status |").unwrap();
    writeln!(report, "|-----|-------|------|--------|").unwrap();

    for entry in entries {
        let rows = entry
            .rows
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let status = if entry.error.is_some() { "failed" } else { "ok" };
        writeln!(
            report,
            "| {} | {} | {} | {} |",
            entry.key,
            escape_cell(&entry.label),
            rows,
            status
        )
        .unwrap();
    }

    if !failed.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Failures").unwrap();
        writeln!(report).unwrap();

        for entry in failed {
            let message = entry.error.as_deref().unwrap_or_default();
            writeln!(report, "- **{}**: {}", entry.key, single_line(message)).unwrap();
        }
    }

    report
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
