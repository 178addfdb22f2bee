//! The in-memory event table and per-application views of it.

use std::path::Path;

use crate::app::AppMatcher;
use crate::error::{IngestError, IngestStats};
use crate::event::NormalizedEvent;
use crate::kind::EventKind;
use crate::labels::LabelStyle;
use crate::merge::merge_streams;
use crate::normalize::Normalizer;
use crate::reader::{DEFAULT_FILE_PATTERN, LineReader, SourceLine};

/// Options for reading a log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Glob of log file names inside the directory.
    pub file_pattern: String,
    /// Label style for transition events.
    pub labels: LabelStyle,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            labels: LabelStyle::default(),
        }
    }
}

/// Every normalized event of one run, in input order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<NormalizedEvent>,
    stats: IngestStats,
}

impl EventLog {
    /// Reads and normalizes all event lines below `dir`.
    ///
    /// Only an unreadable directory or an invalid pattern is an error;
    /// unreadable files and malformed lines are logged, counted and skipped.
    pub fn from_dir(dir: &Path, options: &IngestOptions) -> Result<Self, IngestError> {
        let mut reader = LineReader::open(dir, &options.file_pattern)?;
        let mut log = Self::from_lines(&mut reader, options.labels)?;
        log.stats.files_read = reader.files_opened();

        tracing::info!(
            dir = %dir.display(),
            files = log.stats.files_read,
            lines = log.stats.lines_matched,
            events = log.stats.records,
            errors = log.stats.total_errors(),
            "ingested event log"
        );
        Ok(log)
    }

    /// Normalizes pre-read lines.
    pub fn from_lines<I>(lines: I, labels: LabelStyle) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = Result<SourceLine, IngestError>>,
    {
        let normalizer = Normalizer::new(labels);
        let mut log = Self::default();

        for line in lines {
            let result = line.and_then(|line| {
                log.stats.lines_matched += 1;
                normalizer.normalize(&line)
            });
            match result {
                Ok(Some(event)) => log.events.push(event),
                Ok(None) => log.stats.lines_ignored += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    match &e {
                        IngestError::FileUnreadable { .. } => {
                            tracing::warn!(error = %e, "skipping unreadable log file");
                        }
                        _ => tracing::debug!(error = %e, "skipping malformed event"),
                    }
                    log.stats.record_error(&e);
                }
            }
        }

        log.stats.records = log.events.len();
        Ok(log)
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub const fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Selects one application's events and merges them by timestamp.
    ///
    /// Transitions are concatenated before task changes, so they come first
    /// on equal timestamps. No matches is reported as [`AppEvents::NoData`].
    pub fn for_application(&self, matcher: &AppMatcher) -> AppEvents {
        let of_kind = |kind: EventKind| {
            matcher.filter(self.events.iter().filter(|event| event.kind == kind))
        };
        let events = merge_streams(
            of_kind(EventKind::Transition),
            of_kind(EventKind::TaskChange),
        );

        tracing::debug!(
            application = matcher.application(),
            events = events.len(),
            "selected application events"
        );

        if events.is_empty() {
            AppEvents::NoData {
                application: matcher.application().to_string(),
            }
        } else {
            AppEvents::Events(AppEventLog {
                application: matcher.application().to_string(),
                events,
            })
        }
    }
}

/// Result of selecting an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvents {
    /// At least one event matched.
    Events(AppEventLog),
    /// No event mentions the application; nothing to mine.
    NoData { application: String },
}

impl AppEvents {
    pub fn application(&self) -> &str {
        match self {
            Self::Events(log) => &log.application,
            Self::NoData { application } => application,
        }
    }

    /// Events in timestamp order; empty for [`AppEvents::NoData`].
    pub fn events(&self) -> &[NormalizedEvent] {
        match self {
            Self::Events(log) => &log.events,
            Self::NoData { .. } => &[],
        }
    }

    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// One application's merged, timestamp-ordered events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEventLog {
    application: String,
    events: Vec<NormalizedEvent>,
}

impl AppEventLog {
    /// Wraps events that are already selected and ordered.
    pub fn new(application: impl Into<String>, events: Vec<NormalizedEvent>) -> Self {
        Self {
            application: application.into(),
            events,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    /// The events handed to discovery.
    ///
    /// Task changes describe work items at a finer granularity than case
    /// states and are excluded unless `include_task_changes` is set.
    pub fn discovery_events(&self, include_task_changes: bool) -> Vec<&NormalizedEvent> {
        self.events
            .iter()
            .filter(|event| include_task_changes || event.kind == EventKind::Transition)
            .collect()
    }
}
