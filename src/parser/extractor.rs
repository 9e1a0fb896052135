use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::markers::{find_markers, is_first_phase_marker, QueryKey};
use super::splitter::{find_terminator, split_statements};

/// Start of a query body: `SELECT`, or `WITH ... SELECT` for common table expressions.
static QUERY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(SELECT|WITH\b.+?SELECT)\b").expect("query start pattern")
});

/// One labelled query taken from a marker block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryEntry {
    /// The marker line without its comment leader, e.g. `Q1 - Find something`.
    pub label: String,
    /// The query text, trimmed, without its terminator.
    pub sql: String,
}

/// Everything extracted from one annotated script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedScript {
    /// Statements to run once, before any query.
    pub setup: Vec<String>,
    /// Queries by normalized key; iteration is in ascending key order.
    pub queries: BTreeMap<QueryKey, QueryEntry>,
}

/// Split `raw` into setup statements and labelled queries.
pub fn extract_setup_and_queries(raw: &str) -> ExtractedScript {
    ExtractedScript {
        setup: setup_statements(split_statements(raw)),
        queries: extract_queries(raw),
    }
}

/// Keep the statements that precede the first `Segment 1` phase marker.
///
/// Without a phase marker the whole sequence is setup.
pub fn setup_statements(mut statements: Vec<String>) -> Vec<String> {
    if let Some(idx) = statements.iter().position(|s| is_first_phase_marker(s)) {
        statements.truncate(idx);
    }
    statements
}

/// Collect one query per marker block.
///
/// A block runs from its marker to the next marker (or the end of the text).
/// Markers whose block holds no terminated `SELECT`/`WITH` statement are skipped.
/// When two markers normalize to the same key, the later one wins.
pub fn extract_queries(raw: &str) -> BTreeMap<QueryKey, QueryEntry> {
    let markers = find_markers(raw);
    let mut queries: BTreeMap<QueryKey, QueryEntry> = BTreeMap::new();

    for (idx, marker) in markers.iter().enumerate() {
        let block_end = markers.get(idx + 1).map_or(raw.len(), |next| next.offset);
        let body = &raw[marker.end().min(block_end)..block_end];

        let Some(sql) = query_body(body) else {
            tracing::debug!(marker = %marker.label(), "no query found under marker");
            continue;
        };

        if let Some(previous) = queries.get(&marker.key) {
            tracing::debug!(key = %marker.key, replaced = %previous.label, "duplicate query key, keeping the later one");
        }
        queries.insert(
            marker.key.clone(),
            QueryEntry {
                label: marker.label(),
                sql,
            },
        );
    }

    queries
}

/// Find the first `SELECT`/`WITH` statement in `block` and cut it at the next
/// `;` outside quotes and comments. Returns `None` when either part is missing.
///
/// Comments inside the statement are kept in the returned SQL.
pub fn query_body(block: &str) -> Option<String> {
    let start = QUERY_START.find(block)?.start();
    let end = start + find_terminator(&block[start..])?;
    Some(block[start..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> QueryKey {
        k.parse().unwrap()
    }

    #[test]
    fn marker_produces_padded_key_and_label() {
        let queries = extract_queries("-- Q1 - Find something\nSELECT 1;\n");
        assert_eq!(queries.len(), 1);
        let entry = &queries[&key("Q01")];
        assert_eq!(entry.label, "Q1 - Find something");
        assert_eq!(entry.sql, "SELECT 1");
    }

    #[test]
    fn with_clause_is_captured_whole() {
        let queries = extract_queries("-- Q4 - cte\nWITH t AS (SELECT 1) SELECT * FROM t;");
        assert_eq!(queries[&key("Q04")].sql, "WITH t AS (SELECT 1) SELECT * FROM t");
    }

    #[test]
    fn later_duplicate_wins() {
        let raw = "-- Q7 - first\nSELECT 'a';\n-- Q07 - second\nSELECT 'b';\n";
        let queries = extract_queries(raw);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[&key("Q07")].label, "Q07 - second");
        assert_eq!(queries[&key("Q07")].sql, "SELECT 'b'");
    }

    #[test]
    fn marker_without_query_is_skipped() {
        let raw = "-- Q1 - nothing here\nUPDATE t SET a = 1;\n-- Q2 - ok\nselect 2;";
        let queries = extract_queries(raw);
        assert_eq!(queries.keys().cloned().collect::<Vec<_>>(), [key("Q02")]);
        assert_eq!(queries[&key("Q02")].sql, "select 2");
    }

    #[test]
    fn unterminated_query_is_skipped() {
        assert!(extract_queries("-- Q1 - open\nSELECT 1").is_empty());
    }

    #[test]
    fn query_does_not_leak_into_next_block() {
        let raw = "-- Q1 - a\nSELECT 1\n-- Q2 - b\nSELECT 2;";
        let queries = extract_queries(raw);
        assert!(!queries.contains_key(&key("Q01")));
        assert_eq!(queries[&key("Q02")].sql, "SELECT 2");
    }

    #[test]
    fn label_text_is_not_mistaken_for_sql() {
        let queries = extract_queries("-- Q3 - Select movies with ratings\nSELECT title FROM movie;");
        assert_eq!(queries[&key("Q03")].sql, "SELECT title FROM movie");
    }

    #[test]
    fn quoted_terminator_does_not_cut_the_query() {
        let queries = extract_queries("-- Q2 - q\nSELECT title FROM movie WHERE title LIKE '%;%';");
        assert_eq!(
            queries[&key("Q02")].sql,
            "SELECT title FROM movie WHERE title LIKE '%;%'"
        );
    }

    #[test]
    fn apostrophe_in_line_comment_does_not_swallow_the_terminator() {
        let queries = extract_queries("-- Q1 - Titles\nSELECT title -- the movie's title\nFROM movie;\n");
        assert_eq!(
            queries[&key("Q01")].sql,
            "SELECT title -- the movie's title\nFROM movie"
        );
    }

    #[test]
    fn apostrophes_in_comments_keep_statements_apart() {
        let raw = "-- Q1 - a\nSELECT 1 -- don't\n;\nSELECT 'x' -- it's\nFROM t;\n-- Q2 - b\nSELECT 2;";
        let queries = extract_queries(raw);
        assert_eq!(queries[&key("Q01")].sql, "SELECT 1 -- don't");
        assert_eq!(queries[&key("Q02")].sql, "SELECT 2");
    }

    #[test]
    fn apostrophe_in_block_comment_does_not_swallow_the_terminator() {
        let queries = extract_queries("-- Q3 - c\nSELECT a /* user's pick */ FROM t;");
        assert_eq!(queries[&key("Q03")].sql, "SELECT a /* user's pick */ FROM t");
    }

    #[test]
    fn terminator_inside_comment_does_not_cut_the_query() {
        let queries = extract_queries("-- Q5 - e\nSELECT a -- first; then\nFROM t /* ; */ WHERE a > 1;");
        assert_eq!(
            queries[&key("Q05")].sql,
            "SELECT a -- first; then\nFROM t /* ; */ WHERE a > 1"
        );
    }

    #[test]
    fn query_body_trims_space_before_terminator() {
        assert_eq!(query_body("  SELECT 1   ;").as_deref(), Some("SELECT 1"));
        assert_eq!(query_body("UPDATE x SET y = 1;"), None);
        assert_eq!(query_body("SELECTED;"), None);
    }

    #[test]
    fn setup_stops_before_segment_one() {
        let statements = vec![
            "A".to_string(),
            "B".to_string(),
            "-- Segment 1: start\nSELECT 1".to_string(),
            "C".to_string(),
            "-- Segment 1 again\nD".to_string(),
        ];
        assert_eq!(setup_statements(statements), ["A", "B"]);
    }

    #[test]
    fn setup_is_everything_without_phase_marker() {
        let statements = vec!["A".to_string(), "-- Segment 2\nB".to_string()];
        assert_eq!(setup_statements(statements.clone()), statements);
    }

    #[test]
    fn extraction_without_markers() {
        let script = extract_setup_and_queries("CREATE TABLE t (a INT);\nINSERT INTO t VALUES (1);");
        assert!(script.queries.is_empty());
        assert_eq!(script.setup, ["CREATE TABLE t (a INT)", "INSERT INTO t VALUES (1)"]);
    }
}
