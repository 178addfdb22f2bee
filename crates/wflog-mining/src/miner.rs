//! Discovery strategies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wflog_core::NormalizedEvent;

use crate::MiningError;
use crate::dfg::DirectlyFollowsGraph;
use crate::graph::{Arc, Node, WorkflowGraph};

/// Default noise threshold: keep only the strongest successors.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 1.0;

/// Default dependency threshold of the heuristic strategy.
pub const DEFAULT_DEPENDENCY_THRESHOLD: f64 = 0.5;

/// Infers a workflow graph from an ordered event stream.
pub trait Miner {
    fn kind(&self) -> MinerKind;

    fn discover(&self, events: &[&NormalizedEvent]) -> Result<WorkflowGraph, MiningError>;
}

/// Discovery strategies selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinerKind {
    Inductive,
    Heuristic,
}

impl MinerKind {
    pub const ALL: [Self; 2] = [Self::Inductive, Self::Heuristic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inductive => "inductive",
            Self::Heuristic => "heuristic",
        }
    }

    /// Builds the miner for this strategy.
    pub fn miner(self, settings: &MinerSettings) -> Result<Box<dyn Miner>, MiningError> {
        Ok(match self {
            Self::Inductive => Box::new(InductiveMiner::new(settings.noise_threshold)?),
            Self::Heuristic => Box::new(HeuristicMiner::new(settings.dependency_threshold)?),
        })
    }
}

impl fmt::Display for MinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MinerKind {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inductive" => Ok(Self::Inductive),
            "heuristic" => Ok(Self::Heuristic),
            other => Err(MiningError::UnknownMiner(other.to_string())),
        }
    }
}

/// Parameters shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinerSettings {
    pub noise_threshold: f64,
    pub dependency_threshold: f64,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            dependency_threshold: DEFAULT_DEPENDENCY_THRESHOLD,
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, MiningError> {
    if value.is_nan() || !(min..=max).contains(&value) {
        return Err(MiningError::InvalidThreshold { name, value });
    }
    Ok(value)
}

fn directly_follows(events: &[&NormalizedEvent]) -> Result<DirectlyFollowsGraph, MiningError> {
    let dfg = DirectlyFollowsGraph::from_events(events.iter().copied());
    if dfg.is_empty() {
        return Err(MiningError::EmptyLog);
    }
    Ok(dfg)
}

/// Noise-tolerant strategy in the style of the infrequent inductive miner.
///
/// Works on the directly-follows abstraction: for every source (each
/// activity, and the initial marking) an outgoing arc survives only if its
/// count reaches `noise_threshold` times the strongest outgoing count of that
/// source. Arcs into the final marking are filtered against the strongest end
/// count. At 1.0 only the dominant paths remain; at 0.0 nothing is removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InductiveMiner {
    noise_threshold: f64,
}

impl InductiveMiner {
    pub fn new(noise_threshold: f64) -> Result<Self, MiningError> {
        Ok(Self {
            noise_threshold: check_range("noise_threshold", noise_threshold, 0.0, 1.0)?,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn keeps(&self, count: usize, strongest: usize) -> bool {
        count as f64 >= self.noise_threshold * strongest as f64
    }
}

impl Miner for InductiveMiner {
    fn kind(&self) -> MinerKind {
        MinerKind::Inductive
    }

    fn discover(&self, events: &[&NormalizedEvent]) -> Result<WorkflowGraph, MiningError> {
        let dfg = directly_follows(events)?;
        let mut arcs = Vec::new();

        let strongest_start = dfg.start.values().copied().max().unwrap_or(0);
        for (activity, &count) in &dfg.start {
            if self.keeps(count, strongest_start) {
                arcs.push(Arc {
                    from: Node::Start,
                    to: Node::activity(activity),
                    count,
                });
            }
        }

        let mut strongest_out: BTreeMap<&str, usize> = BTreeMap::new();
        for ((from, _), &count) in &dfg.edges {
            let max = strongest_out.entry(from.as_str()).or_default();
            *max = (*max).max(count);
        }
        for ((from, to), &count) in &dfg.edges {
            if self.keeps(count, strongest_out[from.as_str()]) {
                arcs.push(Arc {
                    from: Node::activity(from),
                    to: Node::activity(to),
                    count,
                });
            }
        }

        let strongest_end = dfg.end.values().copied().max().unwrap_or(0);
        for (activity, &count) in &dfg.end {
            if self.keeps(count, strongest_end) {
                arcs.push(Arc {
                    from: Node::activity(activity),
                    to: Node::End,
                    count,
                });
            }
        }

        tracing::debug!(
            noise_threshold = self.noise_threshold,
            edges = dfg.edges.len(),
            kept = arcs.len(),
            "inductive discovery"
        );

        Ok(WorkflowGraph {
            activities: dfg.activities,
            arcs,
        })
    }
}

/// Frequency/dependency-based strategy.
///
/// The dependency of `a` on `b` is `(|a>b| - |b>a|) / (|a>b| + |b>a| + 1)`,
/// and `|a>a| / (|a>a| + 1)` for loops. Arcs below the threshold are dropped.
/// All observed start and end activities are connected to the markings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicMiner {
    dependency_threshold: f64,
}

impl HeuristicMiner {
    pub fn new(dependency_threshold: f64) -> Result<Self, MiningError> {
        Ok(Self {
            dependency_threshold: check_range(
                "dependency_threshold",
                dependency_threshold,
                -1.0,
                1.0,
            )?,
        })
    }

    /// Dependency measure between two activities.
    #[allow(clippy::cast_precision_loss)]
    pub fn dependency(dfg: &DirectlyFollowsGraph, from: &str, to: &str) -> f64 {
        let forward = dfg.edge_count(from, to) as f64;
        if from == to {
            return forward / (forward + 1.0);
        }
        let backward = dfg.edge_count(to, from) as f64;
        (forward - backward) / (forward + backward + 1.0)
    }
}

impl Miner for HeuristicMiner {
    fn kind(&self) -> MinerKind {
        MinerKind::Heuristic
    }

    fn discover(&self, events: &[&NormalizedEvent]) -> Result<WorkflowGraph, MiningError> {
        let dfg = directly_follows(events)?;

        let starts = dfg.start.iter().map(|(activity, &count)| Arc {
            from: Node::Start,
            to: Node::activity(activity),
            count,
        });
        let edges = dfg
            .edges
            .iter()
            .filter(|((from, to), _)| {
                Self::dependency(&dfg, from, to) >= self.dependency_threshold
            })
            .map(|((from, to), &count)| Arc {
                from: Node::activity(from),
                to: Node::activity(to),
                count,
            });
        let ends = dfg.end.iter().map(|(activity, &count)| Arc {
            from: Node::activity(activity),
            to: Node::End,
            count,
        });
        let arcs: Vec<Arc> = starts.chain(edges).chain(ends).collect();

        tracing::debug!(
            dependency_threshold = self.dependency_threshold,
            edges = dfg.edges.len(),
            kept = arcs.len(),
            "heuristic discovery"
        );

        Ok(WorkflowGraph {
            activities: dfg.activities.clone(),
            arcs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dfg::tests::event;

    /// Three cases: two go open → review → close, one skips review.
    fn log() -> Vec<NormalizedEvent> {
        vec![
            event("1", 0, "open", "ann"),
            event("1", 1, "review", "bob"),
            event("1", 2, "close", "ann"),
            event("2", 0, "open", "ann"),
            event("2", 1, "review", "bob"),
            event("2", 2, "close", "ann"),
            event("3", 0, "open", "ann"),
            event("3", 1, "close", "ann"),
        ]
    }

    fn refs(events: &[NormalizedEvent]) -> Vec<&NormalizedEvent> {
        events.iter().collect()
    }

    fn a(name: &str) -> Node {
        Node::activity(name)
    }

    #[test]
    fn maximal_noise_keeps_dominant_paths() {
        let events = log();
        let graph = InductiveMiner::new(1.0)
            .unwrap()
            .discover(&refs(&events))
            .unwrap();

        assert!(graph.has_arc(&Node::Start, &a("open")));
        assert!(graph.has_arc(&a("open"), &a("review")));
        assert!(!graph.has_arc(&a("open"), &a("close")));
        assert!(graph.has_arc(&a("review"), &a("close")));
        assert!(graph.has_arc(&a("close"), &Node::End));
    }

    #[test]
    fn zero_noise_keeps_everything() {
        let events = log();
        let graph = InductiveMiner::new(0.0)
            .unwrap()
            .discover(&refs(&events))
            .unwrap();
        assert!(graph.has_arc(&a("open"), &a("close")));
        assert_eq!(graph.arcs.len(), 5);
    }

    #[test]
    fn heuristic_drops_weak_dependencies() {
        let events = log();
        // open>close once, no close>open: dependency 1/2 = 0.5.
        let strict = HeuristicMiner::new(0.6)
            .unwrap()
            .discover(&refs(&events))
            .unwrap();
        assert!(!strict.has_arc(&a("open"), &a("close")));
        // open>review twice: dependency 2/3.
        assert!(strict.has_arc(&a("open"), &a("review")));

        let lenient = HeuristicMiner::new(0.5)
            .unwrap()
            .discover(&refs(&events))
            .unwrap();
        assert!(lenient.has_arc(&a("open"), &a("close")));
    }

    #[test]
    fn markings_connect_observed_boundaries() {
        let events = [
            event("1", 0, "open", "ann"),
            event("1", 1, "close", "ann"),
            event("2", 0, "open", "ann"),
            event("2", 1, "close", "ann"),
            event("3", 0, "import", "bob"),
            event("3", 1, "cancel", "bob"),
        ];
        let events = refs(&events);
        let ends = |graph: &WorkflowGraph| -> (Vec<Node>, Vec<Node>) {
            (
                graph.start_arcs().map(|arc| arc.to.clone()).collect(),
                graph.end_arcs().map(|arc| arc.from.clone()).collect(),
            )
        };

        let heuristic = HeuristicMiner::new(0.5).unwrap().discover(&events).unwrap();
        assert_eq!(
            ends(&heuristic),
            (vec![a("import"), a("open")], vec![a("cancel"), a("close")])
        );

        // Only the dominant start and end survive maximal noise filtering.
        let inductive = InductiveMiner::new(1.0).unwrap().discover(&events).unwrap();
        assert_eq!(ends(&inductive), (vec![a("open")], vec![a("close")]));
        assert!(inductive.start_arcs().all(|arc| arc.count == 2));
    }

    #[test]
    fn heuristic_dependency_measure() {
        let events = [
            event("1", 0, "a", "u"),
            event("1", 1, "b", "u"),
            event("2", 0, "b", "u"),
            event("2", 1, "a", "u"),
            event("3", 0, "a", "u"),
            event("3", 1, "a", "u"),
        ];
        let dfg = DirectlyFollowsGraph::from_events(&events);
        assert!(HeuristicMiner::dependency(&dfg, "a", "b").abs() < f64::EPSILON);
        assert!((HeuristicMiner::dependency(&dfg, "a", "a") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_log_is_an_error() {
        for kind in MinerKind::ALL {
            let miner = kind.miner(&MinerSettings::default()).unwrap();
            assert!(matches!(miner.discover(&[]), Err(MiningError::EmptyLog)));
        }
    }

    #[test]
    fn thresholds_are_validated() {
        assert!(InductiveMiner::new(1.5).is_err());
        assert!(InductiveMiner::new(f64::NAN).is_err());
        assert!(HeuristicMiner::new(-2.0).is_err());
        assert!(HeuristicMiner::new(-1.0).is_ok());
    }

    #[test]
    fn miners_by_name() {
        for kind in MinerKind::ALL {
            let parsed: MinerKind = kind.to_string().parse().unwrap();
            let miner = parsed.miner(&MinerSettings::default()).unwrap();
            assert_eq!(miner.kind(), kind);
        }
        assert!("alpha".parse::<MinerKind>().is_err());
    }
}
