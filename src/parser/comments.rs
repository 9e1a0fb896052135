use std::sync::LazyLock;

use regex::Regex;

use super::markers::is_preserved_line;

static INLINE_BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*.*?\*/").expect("inline block comment pattern"));

/// Remove comments from a SQL script, line by line.
///
/// - A line that opens a `/*` block without closing it starts a dropped region;
///   every line up to and including the one containing `*/` is removed.
/// - `/* ... */` spans contained in one line are replaced by a single space.
/// - Query marker lines (`-- Q<n>`) and lines mentioning `Segment <n>` are kept verbatim.
/// - Everywhere else, text from `--` to the end of the line is removed.
///
/// Surviving lines are joined with `\n`. Nesting is not supported.
pub fn filter_comments(raw: &str) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut in_block = false;

    for line in raw.lines() {
        if line.contains("/*") && !line.contains("*/") {
            in_block = true;
        }
        if in_block {
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }

        let line = INLINE_BLOCK_COMMENT.replace_all(line, " ");
        if is_preserved_line(&line) {
            kept.push(line.into_owned());
        } else {
            kept.push(strip_line_comment(&line).to_string());
        }
    }

    kept.join("\n")
}

/// Drop everything from the first `--` to the end of `line`.
///
/// Not quote-aware: a `--` inside a string literal also starts a comment.
pub fn strip_line_comment(line: &str) -> &str {
    match line.find("--") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
