//! The canonical event record handed to discovery.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::EventKind;
use crate::types::{CaseId, UserId};

/// Naive formats accepted after RFC 3339; interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One normalized workflow event.
///
/// The output shape is the same for both kinds; `kind` records which body
/// layout populated the labels and the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Who performed it.
    pub user: UserId,
    /// Display label of the step performed.
    pub activity: String,
    /// Concept name used as the activity key by discovery.
    pub name: String,
    /// State of the case after this event.
    pub state: String,
    /// Workflow instance this event belongs to.
    pub case_id: CaseId,
    /// Encoding the event was read from.
    pub kind: EventKind,
    /// The event segment exactly as logged.
    pub raw_body: String,
}

/// Parses a logged timestamp.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]`, the latter as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
