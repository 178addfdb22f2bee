//! Graphviz rendering of workflow graphs.

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{Node, WorkflowGraph};

/// Visual variants of a rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderStyle {
    /// Activities and arcs annotated with their counts.
    #[serde(rename = "frequency")]
    Frequency,
    /// Bare structure.
    #[serde(rename = "simple")]
    Plain,
}

impl RenderStyle {
    pub const ALL: [Self; 2] = [Self::Frequency, Self::Plain];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Plain => "simple",
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frequency" => Ok(Self::Frequency),
            "simple" | "plain" => Ok(Self::Plain),
            other => Err(format!("unknown render style: {other}")),
        }
    }
}

/// Escapes a string for use inside a double-quoted DOT identifier.
pub fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a graph as a DOT document.
pub fn render(graph: &WorkflowGraph, style: RenderStyle) -> Vec<u8> {
    render_string(graph, style).into_bytes()
}

fn render_string(graph: &WorkflowGraph, style: RenderStyle) -> String {
    let ids: BTreeMap<&str, String> = graph
        .activities
        .keys()
        .enumerate()
        .map(|(i, name)| (name.as_str(), format!("a{i}")))
        .collect();
    let id_of = |node: &Node| -> String {
        match node {
            Node::Start => "start".to_string(),
            Node::End => "end".to_string(),
            Node::Activity(name) => ids
                .get(name.as_str())
                .cloned()
                .unwrap_or_else(|| format!("\"{}\"", escape_label(name))),
        }
    };

    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "digraph workflow {{");
    let _ = writeln!(out, "  graph [rankdir=LR, bgcolor=\"#FFFFFF\"];");
    let _ = writeln!(out, "  node [fontname=\"Helvetica\", fontsize=10];");
    let _ = writeln!(
        out,
        "  start [label=\"\", shape=circle, style=filled, fillcolor=\"#32CD32\", width=0.3];"
    );
    let _ = writeln!(
        out,
        "  end [label=\"\", shape=doublecircle, style=filled, fillcolor=\"#FF8C00\", width=0.3];"
    );

    for (name, count) in &graph.activities {
        let label = match style {
            RenderStyle::Frequency => format!("{} ({count})", escape_label(name)),
            RenderStyle::Plain => escape_label(name),
        };
        let _ = writeln!(
            out,
            "  {} [label=\"{label}\", shape=box, style=rounded];",
            ids[name.as_str()]
        );
    }

    for arc in &graph.arcs {
        let from = id_of(&arc.from);
        let to = id_of(&arc.to);
        match style {
            RenderStyle::Frequency => {
                let _ = writeln!(out, "  {from} -> {to} [label=\"{}\"];", arc.count);
            }
            RenderStyle::Plain => {
                let _ = writeln!(out, "  {from} -> {to};");
            }
        }
    }

    out.push_str("}\n");
    out
}
