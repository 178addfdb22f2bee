//! Event log normalization for workflow process mining.
//!
//! This crate turns raw wiki event logs into a time-ordered stream of
//! [`NormalizedEvent`]s per application:
//! - Reading: event lines from `events.*` files in a directory
//! - Extraction: timestamp, user and event body from pipe-delimited lines
//! - Classification: transition and task-change events
//! - Field extraction: labels and case from `key:value` tokens
//! - Selection: per-application filtering and timestamp-ordered merging

pub mod app;
pub mod error;
pub mod event;
pub mod fields;
pub mod kind;
pub mod labels;
pub mod log;
mod merge;
pub mod normalize;
pub mod reader;
pub mod triple;
pub mod types;

pub use app::{AppMatcher, MatchMode};
pub use error::{ErrorKind, IngestError, IngestStats, Location};
pub use event::NormalizedEvent;
pub use fields::{BodyParsers, EventBodyParser, FieldError, SchemaVersion};
pub use kind::{EventKind, UnknownEventKind};
pub use labels::LabelStyle;
pub use log::{AppEventLog, AppEvents, EventLog, IngestOptions};
pub use merge::merge_streams;
pub use normalize::Normalizer;
pub use reader::{DEFAULT_FILE_PATTERN, LineReader, SourceLine};
pub use triple::{RawTriple, extract_triple};
pub use types::{CaseId, UserId, ValidationError};
