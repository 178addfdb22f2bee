//! Activity and state labels derived from extracted fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between task name and task state in composed labels.
pub const TASK_LABEL_SEPARATOR: &str = " - ";

/// Separator between activity and concept name in qualified transition labels.
pub const QUALIFIED_LABEL_SEPARATOR: &str = ": ";

/// How transition fields become activity labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Activity and name are taken from the event as-is.
    #[default]
    Direct,
    /// Activity and name both become `"<activity>: <name>"`.
    Qualified,
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Qualified => "qualified",
        })
    }
}

impl FromStr for LabelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "qualified" => Ok(Self::Qualified),
            other => Err(format!("unknown label style: {other}")),
        }
    }
}

/// Activity, concept name and state labels of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub activity: String,
    pub name: String,
    pub state: String,
}

impl Labels {
    /// Labels for a transition.
    pub fn transition(activity: &str, name: &str, state: &str, style: LabelStyle) -> Self {
        match style {
            LabelStyle::Direct => Self {
                activity: activity.to_string(),
                name: name.to_string(),
                state: state.to_string(),
            },
            LabelStyle::Qualified => {
                let qualified = format!("{activity}{QUALIFIED_LABEL_SEPARATOR}{name}");
                Self {
                    activity: qualified.clone(),
                    name: qualified,
                    state: state.to_string(),
                }
            }
        }
    }

    /// Labels for a task change: all three carry `"<name> - <state>"`.
    pub fn task(name: &str, state: &str) -> Self {
        let label = format!("{name}{TASK_LABEL_SEPARATOR}{state}");
        Self {
            activity: label.clone(),
            name: label.clone(),
            state: label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_labels_are_identical() {
        let labels = Labels::task("Approve invoice", "done");
        assert_eq!(labels.activity, "Approve invoice - done");
        assert_eq!(labels.activity, labels.name);
        assert_eq!(labels.name, labels.state);
    }

    #[test]
    fn direct_transition_labels_pass_through() {
        let labels = Labels::transition("approve", "Review", "APPROVED", LabelStyle::Direct);
        assert_eq!(labels.activity, "approve");
        assert_eq!(labels.name, "Review");
        assert_eq!(labels.state, "APPROVED");
    }

    #[test]
    fn qualified_transition_labels_join_activity_and_name() {
        let labels = Labels::transition("approve", "Review", "APPROVED", LabelStyle::Qualified);
        assert_eq!(labels.activity, "approve: Review");
        assert_eq!(labels.name, "approve: Review");
        assert_eq!(labels.state, "APPROVED");
    }

    #[test]
    fn label_style_parses() {
        assert_eq!("qualified".parse::<LabelStyle>(), Ok(LabelStyle::Qualified));
        assert!("fancy".parse::<LabelStyle>().is_err());
    }
}
