use super::comments::filter_comments;

/// Quote tracking shared by the statement scanner and the terminator scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QuoteState {
    in_single: bool,
    in_double: bool,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character. A quote toggles only when the other quote kind is
    /// closed and the character is not escaped by a preceding backslash.
    pub(crate) fn advance(&mut self, ch: char) {
        match ch {
            '\'' if !self.in_double && !self.escaped => self.in_single = !self.in_single,
            '"' if !self.in_single && !self.escaped => self.in_double = !self.in_double,
            _ => {}
        }
        self.escaped = ch == '\\' && !self.escaped;
    }

    pub(crate) fn is_quoted(&self) -> bool {
        self.in_single || self.in_double
    }
}

/// Where the terminator scan over unfiltered text currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
    Quoted(QuoteState),
}

/// Byte offset of the first `;` in `text` that is outside quotes and outside
/// `--` / `/* */` comments.
///
/// Works on text that still carries its comments, so an apostrophe in
/// `-- the movie's title` does not open a string.
pub(crate) fn find_terminator(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    let mut state = ScanState::Code;

    while let Some((idx, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        state = match (state, ch, next) {
            (ScanState::Code, ';', _) => return Some(idx),
            (ScanState::Code, '-', Some('-')) => {
                chars.next();
                ScanState::LineComment
            }
            (ScanState::Code, '/', Some('*')) => {
                chars.next();
                ScanState::BlockComment
            }
            (ScanState::Code, '\'' | '"', _) => {
                let mut quote = QuoteState::default();
                quote.advance(ch);
                ScanState::Quoted(quote)
            }
            (ScanState::LineComment, '\n', _) => ScanState::Code,
            (ScanState::BlockComment, '*', Some('/')) => {
                chars.next();
                ScanState::Code
            }
            (ScanState::Quoted(mut quote), _, _) => {
                quote.advance(ch);
                if quote.is_quoted() {
                    ScanState::Quoted(quote)
                } else {
                    ScanState::Code
                }
            }
            (other, _, _) => other,
        };
    }

    None
}

/// Split already comment-filtered text on `;` terminators outside quotes.
///
/// Each statement is trimmed and the terminator dropped; empty statements are
/// skipped. Trailing text without a final `;` becomes the last statement.
/// Unbalanced quotes are not diagnosed: the scan simply ends inside the string.
pub fn scan_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut state = QuoteState::default();
    let mut start = 0usize;

    for (idx, ch) in text.char_indices() {
        state.advance(ch);
        if ch == ';' && !state.is_quoted() {
            push_statement(&mut statements, &text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    push_statement(&mut statements, &text[start..]);

    statements
}

/// Split a raw SQL script into executable statements.
///
/// Comments are filtered first (see [`filter_comments`]), then the result is
/// scanned for statement boundaries (see [`scan_statements`]).
pub fn split_statements(raw: &str) -> Vec<String> {
    scan_statements(&filter_comments(raw))
}

fn push_statement(statements: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_inside_quotes_is_inert() {
        assert_eq!(
            split_statements("SELECT ';' ; SELECT 1;"),
            ["SELECT ';'", "SELECT 1"]
        );
        assert_eq!(
            split_statements(r#"SELECT "a;b"; SELECT 'it''s; fine';"#),
            [r#"SELECT "a;b""#, "SELECT 'it''s; fine'"]
        );
    }

    #[test]
    fn other_quote_kind_does_not_toggle() {
        assert_eq!(
            scan_statements(r#"SELECT 'say "hi;'; SELECT "it's;";"#),
            [r#"SELECT 'say "hi;'"#, r#"SELECT "it's;""#]
        );
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        assert_eq!(
            scan_statements(r"SELECT 'a\';b'; SELECT 2"),
            [r"SELECT 'a\';b'", "SELECT 2"]
        );
    }

    #[test]
    fn escaped_backslash_does_not_escape_the_quote() {
        assert_eq!(
            scan_statements(r"SELECT 'a\\'; SELECT 2;"),
            [r"SELECT 'a\\'", "SELECT 2"]
        );
    }

    #[test]
    fn block_comment_becomes_whitespace() {
        assert_eq!(split_statements("A /* x; y */ B;"), ["A   B"]);
    }

    #[test]
    fn trailing_statement_without_terminator_is_kept() {
        assert_eq!(split_statements("SELECT 1;\nSELECT 2"), ["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn empty_and_whitespace_statements_are_dropped() {
        assert_eq!(split_statements(";;  ;\n-- only a comment\n;SELECT 1;;"), ["SELECT 1"]);
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t").is_empty());
    }

    #[test]
    fn unbalanced_quote_runs_to_end_of_input() {
        assert_eq!(
            scan_statements("SELECT 1; SELECT 'open; SELECT 2;"),
            ["SELECT 1", "SELECT 'open; SELECT 2;"]
        );
    }

    #[test]
    fn marker_lines_stay_attached_to_the_next_statement() {
        let statements = split_statements("SELECT 1;\n-- Q1 - First -- keep\nSELECT 2; -- drop\n");
        assert_eq!(statements, ["SELECT 1", "-- Q1 - First -- keep\nSELECT 2"]);
    }

    #[test]
    fn terminator_skips_comments_and_quotes() {
        assert_eq!(find_terminator("SELECT 1;"), Some(8));
        assert_eq!(find_terminator("SELECT 1 -- it's; here\n;"), Some(23));
        assert_eq!(find_terminator("SELECT /* a's; */ 1;"), Some(19));
        assert_eq!(find_terminator("SELECT 'a;b', \"c;\";"), Some(18));
        assert_eq!(find_terminator(r"SELECT 'it\'s;';"), Some(15));
        assert_eq!(find_terminator("SELECT 1 - 2;"), Some(12));
    }

    #[test]
    fn terminator_missing_or_inside_open_constructs() {
        assert_eq!(find_terminator("SELECT 1"), None);
        assert_eq!(find_terminator("SELECT 1 -- no end;"), None);
        assert_eq!(find_terminator("SELECT /* open; "), None);
        assert_eq!(find_terminator("SELECT 'open;"), None);
    }

    #[test]
    fn multibyte_text_is_sliced_on_char_boundaries() {
        assert_eq!(
            split_statements("SELECT 'café'; SELECT '—';"),
            ["SELECT 'café'", "SELECT '—'"]
        );
    }
}
