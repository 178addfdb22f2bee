//! Handover-of-work social network.
//!
//! A handover from `u` to `v` happens whenever, within one case, an event
//! performed by `u` is directly followed by an event performed by `v`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use wflog_core::{NormalizedEvent, UserId};

use crate::dfg::traces;
use crate::render::escape_label;

/// Weighted handovers between users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoverNetwork {
    counts: BTreeMap<(UserId, UserId), usize>,
    users: BTreeSet<UserId>,
    total: usize,
}

impl HandoverNetwork {
    /// Number of handovers from `from` to `to`.
    pub fn count(&self, from: &UserId, to: &UserId) -> usize {
        self.counts
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Share of all handovers that went from `from` to `to`.
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, from: &UserId, to: &UserId) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(from, to) as f64 / self.total as f64
    }

    /// Every user seen in the log, including those with no handovers.
    pub const fn users(&self) -> &BTreeSet<UserId> {
        &self.users
    }

    pub fn handovers(&self) -> impl Iterator<Item = (&UserId, &UserId, usize)> {
        self.counts
            .iter()
            .map(|((from, to), &count)| (from, to, count))
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Renders the network as a DOT document with normalized edge weights.
    pub fn to_dot(&self) -> Vec<u8> {
        let ids: BTreeMap<&UserId, String> = self
            .users
            .iter()
            .enumerate()
            .map(|(i, user)| (user, format!("u{i}")))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "digraph handover {{");
        let _ = writeln!(out, "  graph [bgcolor=\"#FFFFFF\"];");
        let _ = writeln!(out, "  node [shape=ellipse, fontname=\"Helvetica\", fontsize=10];");
        for (user, id) in &ids {
            let _ = writeln!(out, "  {id} [label=\"{}\"];", escape_label(user.as_str()));
        }
        for (from, to, _) in self.handovers() {
            let _ = writeln!(
                out,
                "  {} -> {} [label=\"{:.3}\"];",
                ids[from],
                ids[to],
                self.value(from, to)
            );
        }
        out.push_str("}\n");
        out.into_bytes()
    }
}

/// Builds the handover network of an event stream.
///
/// Consecutive events by the same user are not handovers.
pub fn handover_of_work<'a, I>(events: I) -> HandoverNetwork
where
    I: IntoIterator<Item = &'a NormalizedEvent>,
{
    let mut network = HandoverNetwork::default();

    for (_, trace) in traces(events) {
        for event in &trace {
            network.users.insert(event.user.clone());
        }
        for pair in trace.windows(2) {
            let (from, to) = (&pair[0].user, &pair[1].user);
            if from == to {
                continue;
            }
            *network
                .counts
                .entry((from.clone(), to.clone()))
                .or_default() += 1;
            network.total += 1;
        }
    }

    tracing::debug!(
        users = network.users.len(),
        handovers = network.total,
        "handover of work"
    );
    network
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dfg::tests::event;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[test]
    fn counts_handovers_within_cases() {
        let events = [
            event("1", 0, "open", "ann"),
            event("1", 1, "review", "bob"),
            event("1", 2, "close", "ann"),
            event("2", 0, "open", "ann"),
            event("2", 1, "edit", "ann"),
            event("2", 2, "review", "bob"),
        ];
        let network = handover_of_work(&events);

        assert_eq!(network.count(&user("ann"), &user("bob")), 2);
        assert_eq!(network.count(&user("bob"), &user("ann")), 1);
        assert_eq!(network.count(&user("ann"), &user("ann")), 0);
        assert_eq!(network.total(), 3);
        assert!((network.value(&user("ann"), &user("bob")) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn handovers_do_not_cross_cases() {
        let events = [event("1", 0, "open", "ann"), event("2", 1, "open", "bob")];
        let network = handover_of_work(&events);
        assert!(network.is_empty());
        assert_eq!(network.users().len(), 2);
        assert!(network.value(&user("ann"), &user("bob")).abs() < f64::EPSILON);
    }

    #[test]
    fn dot_output() {
        let events = [
            event("1", 0, "open", "ann"),
            event("1", 1, "review", "bob"),
        ];
        let dot = String::from_utf8(handover_of_work(&events).to_dot()).unwrap();
        insta::assert_snapshot!(dot, @r##"
        digraph handover {
          graph [bgcolor="#FFFFFF"];
          node [shape=ellipse, fontname="Helvetica", fontsize=10];
          u0 [label="ann"];
          u1 [label="bob"];
          u0 -> u1 [label="1.000"];
        }
        "##);
    }
}
