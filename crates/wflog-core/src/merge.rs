//! Merging the two event families into one ordered stream.

use crate::event::NormalizedEvent;

/// Concatenates transitions and task changes and sorts them by timestamp.
///
/// The sort is stable: events sharing a timestamp keep their input order, so
/// transitions precede task changes on ties.
pub fn merge_streams(
    transitions: Vec<NormalizedEvent>,
    task_changes: Vec<NormalizedEvent>,
) -> Vec<NormalizedEvent> {
    let mut merged = transitions;
    merged.extend(task_changes);
    merged.sort_by_key(|event| event.timestamp);
    merged
}
