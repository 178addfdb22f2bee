//! Splitting event lines into timestamp, user and event body.
//!
//! The wiki writes pipe-delimited lines such as
//!
//! ```text
//! | 2024-01-01T10:00:00Z info | alice | event:TRANSITION;... | 10.0.0.1 |
//! ```
//!
//! The severity word in front of a pipe is optional, as is the leading pipe.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Substring that marks a line as carrying an event.
pub const EVENT_MARKER: &str = "event:";

/// Pipe delimiter, swallowing surrounding whitespace and a preceding severity tag.
static SEGMENT_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\s+(?:debug|info|notice|warning|warn|error|critical|alert|emergency))?\s*\|\s*",
    )
    .unwrap()
});

/// Why a line could not be split.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected timestamp, user and event segments, found {found}")]
    TooFewSegments { found: usize },
    #[error("empty {field} segment")]
    EmptySegment { field: &'static str },
    #[error("event marker is not in the event segment")]
    NoEventBody,
}

/// The three leading segments of an event line, unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTriple {
    pub timestamp: String,
    pub user: String,
    pub body: String,
}

/// Splits a qualifying line into a [`RawTriple`].
///
/// Segments after the body (remote address, extra context) are ignored.
pub fn extract_triple(line: &str) -> Result<RawTriple, LineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut segments = SEGMENT_DELIMITER.split(line).peekable();

    // A leading pipe yields an empty first segment.
    if segments.peek().is_some_and(|s| s.trim().is_empty()) {
        segments.next();
    }

    let parts: Vec<&str> = segments.take(3).map(str::trim).collect();
    let [timestamp, user, body] = parts[..] else {
        return Err(LineError::TooFewSegments { found: parts.len() });
    };

    for (field, value) in [("timestamp", timestamp), ("user", user), ("event", body)] {
        if value.is_empty() {
            return Err(LineError::EmptySegment { field });
        }
    }
    if !body.contains(EVENT_MARKER) {
        return Err(LineError::NoEventBody);
    }

    Ok(RawTriple {
        timestamp: timestamp.to_string(),
        user: user.to_string(),
        body: body.to_string(),
    })
}
