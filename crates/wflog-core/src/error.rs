//! Ingest errors and per-run statistics.
//!
//! Only directory-level failures and invalid patterns abort a run. Every
//! other error affects a single file, line or record; those are logged,
//! counted in [`IngestStats`] and skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::fields::FieldError;
use crate::kind::EventKind;
use crate::triple::LineError;

/// Position of a line in the input, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Errors raised while turning raw log files into normalized events.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The input directory is missing or cannot be listed.
    #[error("cannot read input directory {}: {source}", path.display())]
    InputDirectoryUnreadable { path: PathBuf, source: io::Error },

    /// A single log file could not be opened or read to the end.
    #[error("cannot read log file {}: {source}", path.display())]
    FileUnreadable { path: PathBuf, source: io::Error },

    /// A line with an event marker did not split into timestamp, user and body.
    #[error("{location}: malformed line: {source}")]
    MalformedLine {
        location: Location,
        source: LineError,
    },

    /// The event body did not have the layout its kind requires.
    #[error("{location}: malformed {kind} event: {source}")]
    MalformedEventField {
        location: Location,
        kind: EventKind,
        source: FieldError,
    },

    /// The timestamp segment is not a recognised date-time.
    #[error("{location}: unparseable timestamp {value:?}")]
    MalformedTimestamp { location: Location, value: String },

    /// A file glob or application pattern is invalid.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl IngestError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InputDirectoryUnreadable { .. } => ErrorKind::InputDirectoryUnreadable,
            Self::FileUnreadable { .. } => ErrorKind::FileUnreadable,
            Self::MalformedLine { .. } => ErrorKind::MalformedLine,
            Self::MalformedEventField { .. } => ErrorKind::MalformedEventField,
            Self::MalformedTimestamp { .. } => ErrorKind::MalformedTimestamp,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
        }
    }

    /// Whether this error aborts the whole run.
    pub const fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

/// Discriminant of [`IngestError`], used as a statistics key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputDirectoryUnreadable,
    FileUnreadable,
    MalformedLine,
    MalformedEventField,
    MalformedTimestamp,
    InvalidPattern,
}

impl ErrorKind {
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::InputDirectoryUnreadable | Self::InvalidPattern)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputDirectoryUnreadable => "input_directory_unreadable",
            Self::FileUnreadable => "file_unreadable",
            Self::MalformedLine => "malformed_line",
            Self::MalformedEventField => "malformed_event_field",
            Self::MalformedTimestamp => "malformed_timestamp",
            Self::InvalidPattern => "invalid_pattern",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected while ingesting a directory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Log files opened.
    pub files_read: usize,
    /// Lines containing the event marker.
    pub lines_matched: usize,
    /// Lines whose body is neither a transition nor a task change.
    pub lines_ignored: usize,
    /// Normalized events produced.
    pub records: usize,
    /// Recoverable errors by kind.
    pub errors: BTreeMap<ErrorKind, usize>,
}

impl IngestStats {
    /// Counts a recoverable error.
    pub fn record_error(&mut self, error: &IngestError) {
        *self.errors.entry(error.kind()).or_default() += 1;
    }

    pub fn error_count(&self, kind: ErrorKind) -> usize {
        self.errors.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_errors(&self) -> usize {
        self.errors.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_directory_and_pattern_errors_are_fatal() {
        let fatal = [ErrorKind::InputDirectoryUnreadable, ErrorKind::InvalidPattern];
        let recoverable = [
            ErrorKind::FileUnreadable,
            ErrorKind::MalformedLine,
            ErrorKind::MalformedEventField,
            ErrorKind::MalformedTimestamp,
        ];
        assert!(fatal.iter().all(|k| k.is_fatal()));
        assert!(recoverable.iter().all(|k| !k.is_fatal()));
    }

    #[test]
    fn stats_count_by_kind() {
        let mut stats = IngestStats::default();
        let err = IngestError::MalformedTimestamp {
            location: Location::new("events.2024-01", 3),
            value: "yesterday".to_string(),
        };
        stats.record_error(&err);
        stats.record_error(&err);

        assert_eq!(stats.error_count(ErrorKind::MalformedTimestamp), 2);
        assert_eq!(stats.error_count(ErrorKind::MalformedLine), 0);
        assert_eq!(stats.total_errors(), 2);
    }

    #[test]
    fn error_message_includes_location() {
        let err = IngestError::MalformedTimestamp {
            location: Location::new("logs/events.2024-01", 12),
            value: "soon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "logs/events.2024-01:12: unparseable timestamp \"soon\""
        );
    }
}
