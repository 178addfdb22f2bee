//! Process discovery over normalized event streams.
//!
//! - [`dfg`]: traces and directly-follows counts
//! - [`miner`]: inductive and heuristic discovery into a [`WorkflowGraph`]
//! - [`render`]: Graphviz output in frequency and plain styles
//! - [`handover`]: handover-of-work network between users

pub mod dfg;
pub mod graph;
pub mod handover;
pub mod miner;
pub mod render;

use thiserror::Error;

pub use dfg::{DirectlyFollowsGraph, traces};
pub use graph::{Arc, Node, WorkflowGraph};
pub use handover::{HandoverNetwork, handover_of_work};
pub use miner::{
    DEFAULT_DEPENDENCY_THRESHOLD, DEFAULT_NOISE_THRESHOLD, HeuristicMiner, InductiveMiner, Miner,
    MinerKind, MinerSettings,
};
pub use render::{RenderStyle, escape_label, render};

/// Errors raised by discovery.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MiningError {
    #[error("no cases to mine")]
    EmptyLog,

    #[error("{name} must be within range, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("unknown miner: {0}")]
    UnknownMiner(String),
}
