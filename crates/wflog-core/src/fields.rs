//! Field extraction from semicolon-delimited event bodies.
//!
//! An event body is a list of `key:value` tokens separated by `;`, the first
//! being the kind marker (`event:TRANSITION` or `event:TASKCHANGE`). Two
//! layouts exist:
//!
//! - **Named** (`schema:2`): fields are looked up by key.
//! - **Positional** (`schema:1`, the historical layout): fields sit at fixed
//!   token positions and the key is discarded. This is a compatibility shim
//!   for logs written before keys were stable.
//!
//! A `schema:<n>` token selects the layout explicitly and is not counted as a
//! position. Untagged bodies are read positionally; they are read by name
//! only when the tokens do not fit the positional layout (too few of them, or
//! a retained one without a `key:`) and every required key is present.

use thiserror::Error;

use crate::kind::EventKind;
use crate::labels::{LabelStyle, Labels};
use crate::types::CaseId;

/// Key of the token that tags a body with its layout version.
pub const SCHEMA_KEY: &str = "schema";

/// Why an event body could not be turned into fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected at least {expected} tokens, found {found}")]
    TooFewTokens { expected: usize, found: usize },
    #[error("token {index} ({token:?}) is not a key:value pair")]
    NotKeyValue { index: usize, token: String },
    #[error("missing required key {key:?}")]
    MissingKey { key: &'static str },
    #[error("empty {field} value")]
    EmptyValue { field: &'static str },
    #[error("unsupported schema version {0:?}")]
    UnsupportedSchema(String),
}

/// Layout of an event body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    Positional,
    Named,
}

impl SchemaVersion {
    fn from_tag(tag: &str) -> Result<Self, FieldError> {
        match tag {
            "1" => Ok(Self::Positional),
            "2" => Ok(Self::Named),
            other => Err(FieldError::UnsupportedSchema(other.to_string())),
        }
    }
}

/// Fields extracted from one event body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub labels: Labels,
    pub case_id: CaseId,
}

/// Turns the body of one event kind into [`EventFields`].
pub trait EventBodyParser {
    /// The kind of body this parser understands.
    fn kind(&self) -> EventKind;

    /// Extracts labels and case from `body`.
    fn parse(&self, body: &str) -> Result<EventFields, FieldError>;
}

fn split_key_value(token: &str) -> Option<(&str, &str)> {
    token
        .split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
}

/// Tokens of a body with the schema tag set aside.
struct Tokens<'a> {
    tokens: Vec<&'a str>,
    schema: Option<&'a str>,
}

impl<'a> Tokens<'a> {
    fn new(body: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut schema = None;
        for token in body.split(';') {
            match split_key_value(token) {
                Some((SCHEMA_KEY, version)) if schema.is_none() => schema = Some(version),
                _ => tokens.push(token),
            }
        }
        Self { tokens, schema }
    }

    /// Extracts fields with the layout the body calls for.
    fn extract<T>(
        &self,
        required: &[&'static str],
        positional: impl Fn(&Self) -> Result<T, FieldError>,
        named: impl Fn(&Self) -> Result<T, FieldError>,
    ) -> Result<T, FieldError> {
        match self.schema.map(SchemaVersion::from_tag).transpose()? {
            Some(SchemaVersion::Positional) => positional(self),
            Some(SchemaVersion::Named) => named(self),
            None => match positional(self) {
                Err(FieldError::TooFewTokens { .. } | FieldError::NotKeyValue { .. })
                    if required.iter().all(|key| self.named(key).is_some()) =>
                {
                    named(self)
                }
                result => result,
            },
        }
    }

    /// Value of the token at `index`, with its key stripped.
    fn value_at(&self, index: usize) -> Result<&'a str, FieldError> {
        let token = self
            .tokens
            .get(index)
            .ok_or(FieldError::TooFewTokens {
                expected: index + 1,
                found: self.tokens.len(),
            })?;
        split_key_value(token)
            .map(|(_, value)| value)
            .ok_or_else(|| FieldError::NotKeyValue {
                index,
                token: (*token).to_string(),
            })
    }

    /// Value of the first token whose key is `key`.
    fn named(&self, key: &str) -> Option<&'a str> {
        self.tokens
            .iter()
            .filter_map(|token| split_key_value(token))
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    fn require(&self, key: &'static str) -> Result<&'a str, FieldError> {
        self.named(key).ok_or(FieldError::MissingKey { key })
    }
}

fn case_id(value: &str) -> Result<CaseId, FieldError> {
    CaseId::new(value).map_err(|_| FieldError::EmptyValue { field: "case" })
}

/// Parser for `event:TRANSITION` bodies.
///
/// Positional layout: tokens 0, 4 and 6 are metadata; tokens 1, 2, 3 and 5
/// are activity, concept name, current state and case.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionParser {
    pub labels: LabelStyle,
}

impl TransitionParser {
    const REQUIRED: [&'static str; 2] = ["concept", "case"];
}

impl EventBodyParser for TransitionParser {
    fn kind(&self) -> EventKind {
        EventKind::Transition
    }

    fn parse(&self, body: &str) -> Result<EventFields, FieldError> {
        let tokens = Tokens::new(body);
        let (activity, name, state, case) = tokens.extract(
            &Self::REQUIRED,
            |tokens| {
                Ok((
                    tokens.value_at(1)?,
                    tokens.value_at(2)?,
                    tokens.value_at(3)?,
                    tokens.value_at(5)?,
                ))
            },
            |tokens| {
                let name = tokens.require("concept")?;
                Ok((
                    tokens.named("activity").unwrap_or(name),
                    name,
                    tokens.named("state").unwrap_or(name),
                    tokens.require("case")?,
                ))
            },
        )?;

        Ok(EventFields {
            labels: Labels::transition(activity, name, state, self.labels),
            case_id: case_id(case)?,
        })
    }
}

/// Parser for `event:TASKCHANGE` bodies.
///
/// Positional layout: tokens 0, 2, 4 and 7 onward are metadata; tokens 1, 3,
/// 5 and 6 are task id, case, task state and task name. The task id is
/// validated but not kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskChangeParser;

impl TaskChangeParser {
    const REQUIRED: [&'static str; 3] = ["name", "case", "state"];
}

impl EventBodyParser for TaskChangeParser {
    fn kind(&self) -> EventKind {
        EventKind::TaskChange
    }

    fn parse(&self, body: &str) -> Result<EventFields, FieldError> {
        let tokens = Tokens::new(body);
        let (case, state, name) = tokens.extract(
            &Self::REQUIRED,
            |tokens| {
                let _task_id = tokens.value_at(1)?;
                Ok((tokens.value_at(3)?, tokens.value_at(5)?, tokens.value_at(6)?))
            },
            |tokens| {
                Ok((
                    tokens.require("case")?,
                    tokens.require("state")?,
                    tokens.require("name")?,
                ))
            },
        )?;

        Ok(EventFields {
            labels: Labels::task(name, state),
            case_id: case_id(case)?,
        })
    }
}

/// One parser per [`EventKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParsers {
    transition: TransitionParser,
    task_change: TaskChangeParser,
}

impl BodyParsers {
    pub const fn new(labels: LabelStyle) -> Self {
        Self {
            transition: TransitionParser { labels },
            task_change: TaskChangeParser,
        }
    }

    pub fn for_kind(&self, kind: EventKind) -> &dyn EventBodyParser {
        match kind {
            EventKind::Transition => &self.transition,
            EventKind::TaskChange => &self.task_change,
        }
    }
}
