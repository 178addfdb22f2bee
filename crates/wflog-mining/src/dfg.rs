//! Traces and the directly-follows relation.

use std::collections::{BTreeMap, HashMap};

use wflog_core::{CaseId, NormalizedEvent};

/// Groups events by case.
///
/// Cases appear in order of their first event; events within a case are
/// stably sorted by timestamp.
pub fn traces<'a, I>(events: I) -> Vec<(&'a CaseId, Vec<&'a NormalizedEvent>)>
where
    I: IntoIterator<Item = &'a NormalizedEvent>,
{
    let mut index: HashMap<&CaseId, usize> = HashMap::new();
    let mut traces: Vec<(&CaseId, Vec<&NormalizedEvent>)> = Vec::new();

    for event in events {
        let slot = *index.entry(&event.case_id).or_insert_with(|| {
            traces.push((&event.case_id, Vec::new()));
            traces.len() - 1
        });
        traces[slot].1.push(event);
    }

    for (_, trace) in &mut traces {
        trace.sort_by_key(|event| event.timestamp);
    }
    traces
}

/// Frequencies of activities and of their direct successions.
///
/// Activities are keyed by the event's concept name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectlyFollowsGraph {
    /// Occurrences per activity.
    pub activities: BTreeMap<String, usize>,
    /// Occurrences of `a` directly followed by `b` within a case.
    pub edges: BTreeMap<(String, String), usize>,
    /// Cases starting with each activity.
    pub start: BTreeMap<String, usize>,
    /// Cases ending with each activity.
    pub end: BTreeMap<String, usize>,
    /// Number of cases.
    pub trace_count: usize,
}

impl DirectlyFollowsGraph {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedEvent>,
    {
        let mut dfg = Self::default();

        for (_, trace) in traces(events) {
            let names: Vec<&str> = trace.iter().map(|event| event.name.as_str()).collect();
            let (Some(first), Some(last)) = (names.first(), names.last()) else {
                continue;
            };

            dfg.trace_count += 1;
            *dfg.start.entry((*first).to_string()).or_default() += 1;
            *dfg.end.entry((*last).to_string()).or_default() += 1;
            for name in &names {
                *dfg.activities.entry((*name).to_string()).or_default() += 1;
            }
            for pair in names.windows(2) {
                *dfg
                    .edges
                    .entry((pair[0].to_string(), pair[1].to_string()))
                    .or_default() += 1;
            }
        }

        dfg
    }

    pub fn edge_count(&self, from: &str, to: &str) -> usize {
        self.edges
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub const fn is_empty(&self) -> bool {
        self.trace_count == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use wflog_core::{EventKind, UserId};

    pub(crate) fn event(case: &str, minute: u32, name: &str, user: &str) -> NormalizedEvent {
        NormalizedEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap(),
            user: UserId::new(user).unwrap(),
            activity: name.to_string(),
            name: name.to_string(),
            state: name.to_string(),
            case_id: CaseId::new(case).unwrap(),
            kind: EventKind::Transition,
            raw_body: String::new(),
        }
    }

    #[test]
    fn groups_by_case_in_first_seen_order() {
        let events = [
            event("B", 1, "x", "u"),
            event("A", 2, "y", "u"),
            event("B", 0, "z", "u"),
        ];
        let grouped = traces(&events);
        let cases: Vec<&str> = grouped.iter().map(|(case, _)| case.as_str()).collect();
        assert_eq!(cases, vec!["B", "A"]);

        let b: Vec<&str> = grouped[0].1.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(b, vec!["z", "x"]);
    }

    #[test]
    fn counts_successions_per_case() {
        let events = [
            event("1", 0, "open", "u"),
            event("1", 1, "review", "u"),
            event("1", 2, "close", "u"),
            event("2", 0, "open", "u"),
            event("2", 1, "close", "u"),
        ];
        let dfg = DirectlyFollowsGraph::from_events(&events);

        assert_eq!(dfg.trace_count, 2);
        assert_eq!(dfg.activities["open"], 2);
        assert_eq!(dfg.edge_count("open", "review"), 1);
        assert_eq!(dfg.edge_count("open", "close"), 1);
        assert_eq!(dfg.edge_count("review", "close"), 1);
        assert_eq!(dfg.edge_count("close", "open"), 0);
        assert_eq!(dfg.start["open"], 2);
        assert_eq!(dfg.end["close"], 2);
    }

    #[test]
    fn no_events_no_traces() {
        let none: [NormalizedEvent; 0] = [];
        let dfg = DirectlyFollowsGraph::from_events(&none);
        assert!(dfg.is_empty());
    }
}
