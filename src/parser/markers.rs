use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// A query marker line: `-- Q<digits>`, an optional dash-like separator, then free text.
static QUERY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*--\s*(Q[0-9]+)\s*[—\-–]*\s*(.*)$").expect("query marker pattern")
});

/// Same marker anchored to the start of a single line, used by the comment filter.
static QUERY_MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*--\s*Q[0-9]+").expect("marker line pattern"));

static PHASE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Segment\s+[0-9]+").expect("phase marker pattern"));

static FIRST_PHASE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSegment\s*1\b").expect("first phase marker pattern"));

/// Canonical query identifier, rendered as `Q` plus at least two digits (`Q07`, `Q10`, `Q123`).
///
/// Keys order numerically, so `Q99` sorts before `Q100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    digits: String,
}

impl QueryKey {
    /// Build a key from the numeric part of a marker (`"7"`, `"07"`, `"0012"`).
    ///
    /// Returns `None` when `digits` is empty or contains anything but ASCII digits.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self {
            digits: digits.to_string(),
        })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{:0>2}", self.digits)
    }
}

impl Ord for QueryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for QueryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for QueryKey {
    type Err = String;

    /// Accepts `Q7`, `q07` or a bare `7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        Self::from_digits(digits).ok_or_else(|| format!("Invalid query key '{s}'"))
    }
}

impl Serialize for QueryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One query marker occurrence in the raw script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Digits following the `Q`, exactly as written.
    pub number: String,
    /// The normalized key for this marker.
    pub key: QueryKey,
    /// Byte offset of the start of the match in the raw text.
    pub offset: usize,
    /// The full matched marker text.
    pub line: String,
}

impl Marker {
    /// Byte offset just past the marker line.
    pub fn end(&self) -> usize {
        self.offset + self.line.len()
    }

    /// Human-readable label: the marker line without its comment leader.
    pub fn label(&self) -> String {
        self.line
            .trim()
            .trim_start_matches('-')
            .trim()
            .to_string()
    }
}

/// Find every query marker in `raw`, in order of appearance.
pub fn find_markers(raw: &str) -> Vec<Marker> {
    QUERY_MARKER
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = &caps.get(1)?.as_str()[1..];
            Some(Marker {
                key: QueryKey::from_digits(number)?,
                number: number.to_string(),
                offset: whole.start(),
                line: whole.as_str().to_string(),
            })
        })
        .collect()
}

/// Lines that survive comment stripping verbatim: query markers and phase markers.
pub fn is_preserved_line(line: &str) -> bool {
    QUERY_MARKER_LINE.is_match(line) || PHASE_MARKER.is_match(line)
}

/// True when `statement` carries the phase marker that opens the first query segment.
pub fn is_first_phase_marker(statement: &str) -> bool {
    FIRST_PHASE_MARKER.is_match(statement)
}
