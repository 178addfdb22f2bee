//! Event families recognised in the event body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two event encodings the wiki writes to its event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A workflow case moved from one state to another.
    Transition,
    /// A task attached to a case changed its lifecycle state.
    TaskChange,
}

impl EventKind {
    /// All kinds, in merge order.
    pub const ALL: [Self; 2] = [Self::Transition, Self::TaskChange];

    /// The literal that identifies this kind inside an event body.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Transition => "event:TRANSITION",
            Self::TaskChange => "event:TASKCHANGE",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::TaskChange => "task_change",
        }
    }

    /// Classifies an event body by its marker.
    ///
    /// Returns `None` for bodies carrying neither marker; such lines are
    /// ordinary wiki events (view, save, login, ...) and are not an error.
    /// If both markers occur, the one appearing first wins.
    pub fn classify(body: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter_map(|kind| body.find(kind.marker()).map(|pos| (pos, kind)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, kind)| kind)
    }

    /// Byte offset just past this kind's marker in `body`.
    pub fn marker_end(self, body: &str) -> Option<usize> {
        body.find(self.marker()).map(|pos| pos + self.marker().len())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transition" | "TRANSITION" => Ok(Self::Transition),
            "task_change" | "TASKCHANGE" => Ok(Self::TaskChange),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}
