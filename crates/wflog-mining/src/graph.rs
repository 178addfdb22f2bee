//! Workflow graphs produced by discovery.

use std::collections::BTreeMap;

use serde::Serialize;

/// A place or activity in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Node {
    /// Initial marking: every case starts here.
    Start,
    /// Final marking: every case ends here.
    End,
    Activity(String),
}

impl Node {
    pub fn activity(name: impl Into<String>) -> Self {
        Self::Activity(name.into())
    }
}

/// A directed, weighted connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arc {
    pub from: Node,
    pub to: Node,
    /// How often the connection was observed.
    pub count: usize,
}

/// Activities and the arcs kept by a miner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowGraph {
    /// Occurrences per activity.
    pub activities: BTreeMap<String, usize>,
    pub arcs: Vec<Arc>,
}

impl WorkflowGraph {
    pub fn has_arc(&self, from: &Node, to: &Node) -> bool {
        self.arcs.iter().any(|arc| &arc.from == from && &arc.to == to)
    }

    /// Arcs leaving the initial marking.
    pub fn start_arcs(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter().filter(|arc| arc.from == Node::Start)
    }

    /// Arcs entering the final marking.
    pub fn end_arcs(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter().filter(|arc| arc.to == Node::End)
    }
}
