//! Turning one event line into a [`NormalizedEvent`].

use crate::error::IngestError;
use crate::event::{NormalizedEvent, parse_timestamp};
use crate::fields::BodyParsers;
use crate::kind::EventKind;
use crate::labels::LabelStyle;
use crate::reader::SourceLine;
use crate::triple::{LineError, extract_triple};
use crate::types::UserId;

/// Stateless line normalizer.
///
/// The same line always yields the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    parsers: BodyParsers,
}

impl Normalizer {
    pub const fn new(labels: LabelStyle) -> Self {
        Self {
            parsers: BodyParsers::new(labels),
        }
    }

    /// Normalizes one line.
    ///
    /// Returns `Ok(None)` for events that are neither transitions nor task
    /// changes.
    pub fn normalize(&self, line: &SourceLine) -> Result<Option<NormalizedEvent>, IngestError> {
        let triple = extract_triple(&line.text).map_err(|source| IngestError::MalformedLine {
            location: line.location.clone(),
            source,
        })?;

        let Some(kind) = EventKind::classify(&triple.body) else {
            return Ok(None);
        };

        let fields = self
            .parsers
            .for_kind(kind)
            .parse(&triple.body)
            .map_err(|source| IngestError::MalformedEventField {
                location: line.location.clone(),
                kind,
                source,
            })?;

        let timestamp =
            parse_timestamp(&triple.timestamp).ok_or_else(|| IngestError::MalformedTimestamp {
                location: line.location.clone(),
                value: triple.timestamp.clone(),
            })?;

        // The triple extractor already rejects empty users.
        let user = UserId::new(triple.user).map_err(|_| IngestError::MalformedLine {
            location: line.location.clone(),
            source: LineError::EmptySegment { field: "user" },
        })?;

        Ok(Some(NormalizedEvent {
            timestamp,
            user,
            activity: fields.labels.activity,
            name: fields.labels.name,
            state: fields.labels.state,
            case_id: fields.case_id,
            kind,
            raw_body: triple.body,
        }))
    }
}
