#![allow(dead_code)]

use std::path::PathBuf;

use sqlmark::executor::{self, QueryOutcome, SqliteExecutor};
use sqlmark::parser::{extract_setup_and_queries, split_statements, ExtractedScript};

pub(crate) fn fixture_path(fixture: &str, file: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture).join(file)
}

pub(crate) fn read_fixture(fixture: &str, file: &str) -> String {
    let path = fixture_path(fixture, file);
    sqlmark::source::read_text(&path)
        .unwrap_or_else(|e| panic!("fixture {} should be readable: {e}", path.display()))
}

pub(crate) fn extract_fixture(fixture: &str) -> ExtractedScript {
    extract_setup_and_queries(&read_fixture(fixture, "solved.sql"))
}

/// Load the dataset and the solved file's setup into a fresh in-memory database.
pub(crate) fn seeded_executor(fixture: &str) -> (SqliteExecutor, ExtractedScript) {
    let mut db = SqliteExecutor::open_in_memory().expect("in-memory database should open");
    let dataset = split_statements(&read_fixture(fixture, "dataset.sql"));
    let summary = executor::run_statements(&mut db, &dataset, false);
    assert_eq!(summary.failed, 0, "dataset statements should all run");

    let script = extract_fixture(fixture);
    executor::run_statements(&mut db, &script.setup, false);
    (db, script)
}

pub(crate) fn run_fixture(fixture: &str) -> Vec<QueryOutcome> {
    let (mut db, script) = seeded_executor(fixture);
    executor::run_queries(&mut db, &script.queries)
}

pub(crate) fn outcome<'a>(outcomes: &'a [QueryOutcome], key: &str) -> &'a QueryOutcome {
    outcomes
        .iter()
        .find(|o| o.key.to_string() == key)
        .unwrap_or_else(|| panic!("expected an outcome for {key}"))
}
