//! Selecting the events that belong to one wiki application.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::event::NormalizedEvent;
use crate::kind::EventKind;

/// How an application identifier is looked up in an event body.
///
/// Matching always considers only the text after the kind marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The identifier must be a whole field value: preceded by the start,
    /// `;` or `:` and followed by `;` or the end.
    #[default]
    Token,
    /// The identifier may occur anywhere. `AppA` also matches `AppAdmin`.
    Substring,
    /// The identifier is a regular expression fragment.
    Regex,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Token => "token",
            Self::Substring => "substring",
            Self::Regex => "regex",
        })
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(Self::Token),
            "substring" => Ok(Self::Substring),
            "regex" => Ok(Self::Regex),
            other => Err(format!("unknown match mode: {other}")),
        }
    }
}

/// Tests event bodies against one application identifier.
#[derive(Debug, Clone)]
pub struct AppMatcher {
    application: String,
    mode: MatchMode,
    pattern: Option<Regex>,
}

impl AppMatcher {
    pub fn new(application: impl Into<String>, mode: MatchMode) -> Result<Self, IngestError> {
        let application = application.into();
        let invalid = |reason: String| IngestError::InvalidPattern {
            pattern: application.clone(),
            reason,
        };
        if application.trim().is_empty() {
            return Err(invalid("application identifier is empty".to_string()));
        }

        let pattern = match mode {
            MatchMode::Token => Some(format!(
                r"(?:^|[;:]){}(?:;|$)",
                regex::escape(&application)
            )),
            MatchMode::Substring => None,
            MatchMode::Regex => Some(application.clone()),
        };
        let pattern = pattern
            .map(|p| Regex::new(&p).map_err(|e| invalid(e.to_string())))
            .transpose()?;

        Ok(Self {
            application,
            mode,
            pattern,
        })
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether a body of `kind` belongs to this application.
    pub fn matches_body(&self, kind: EventKind, body: &str) -> bool {
        let Some(start) = kind.marker_end(body) else {
            return false;
        };
        let rest = &body[start..];
        match &self.pattern {
            Some(pattern) => pattern.is_match(rest),
            None => rest.contains(&self.application),
        }
    }

    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        self.matches_body(event.kind, &event.raw_body)
    }

    /// Keeps the events of this application, preserving order.
    pub fn filter<'a, I>(&self, events: I) -> Vec<NormalizedEvent>
    where
        I: IntoIterator<Item = &'a NormalizedEvent>,
    {
        events
            .into_iter()
            .filter(|event| self.matches(event))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "event:TRANSITION;x;y;AppA;z;concept:Review;w;case:Case1";

    fn matcher(app: &str, mode: MatchMode) -> AppMatcher {
        AppMatcher::new(app, mode).unwrap()
    }

    #[test]
    fn token_mode_requires_whole_value() {
        assert!(matcher("AppA", MatchMode::Token).matches_body(EventKind::Transition, BODY));
        assert!(!matcher("App", MatchMode::Token).matches_body(EventKind::Transition, BODY));
    }

    #[test]
    fn token_mode_accepts_key_value_and_trailing_position() {
        let body = "event:TASKCHANGE;id:1;app:Unit/LeaveWFG";
        let m = matcher("Unit/LeaveWFG", MatchMode::Token);
        assert!(m.matches_body(EventKind::TaskChange, body));
        assert!(!matcher("LeaveWFG", MatchMode::Token).matches_body(EventKind::TaskChange, body));
    }

    #[test]
    fn token_mode_escapes_metacharacters() {
        let m = matcher("App.A", MatchMode::Token);
        assert!(!m.matches_body(EventKind::Transition, "event:TRANSITION;app:AppXA"));
        assert!(m.matches_body(EventKind::Transition, "event:TRANSITION;app:App.A"));
    }

    #[test]
    fn substring_mode_cross_matches_prefixes() {
        let m = matcher("App", MatchMode::Substring);
        assert!(m.matches_body(EventKind::Transition, BODY));
    }

    #[test]
    fn regex_mode_uses_fragment() {
        let m = matcher(":App[AB];", MatchMode::Regex);
        assert!(m.matches_body(EventKind::Transition, "event:TRANSITION;web:AppB;c:1"));
        assert!(!m.matches_body(EventKind::Transition, "event:TRANSITION;web:AppC;c:1"));
    }

    #[test]
    fn requires_the_right_marker() {
        let m = matcher("AppA", MatchMode::Token);
        assert!(!m.matches_body(EventKind::TaskChange, BODY));
    }

    #[test]
    fn identifier_before_marker_does_not_count() {
        let m = matcher("AppA", MatchMode::Substring);
        assert!(!m.matches_body(EventKind::Transition, "AppA;event:TRANSITION;x:1"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = AppMatcher::new("App(", MatchMode::Regex).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        assert!(AppMatcher::new(" ", MatchMode::Substring).is_err());
    }

    #[test]
    fn match_mode_parses() {
        assert_eq!("substring".parse::<MatchMode>(), Ok(MatchMode::Substring));
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
