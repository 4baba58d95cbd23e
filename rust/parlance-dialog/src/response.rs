//! What a dialog turn hands back to the front end.

use std::fmt;

use serde::Serialize;

use crate::value::EntityMap;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The handler ran; `entities` holds what it was given.
    Completed,
    /// A required entity is missing and the text asks for it.
    Prompted,
    /// The user quit a pending prompt.
    Cancelled,
    /// Nothing matched.
    NotUnderstood,
    /// The handler failed.
    Failed,
}

/// The reply to one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub text: String,
    pub outcome: Outcome,
    pub entities: EntityMap,
}

impl Response {
    pub fn new(text: impl Into<String>, outcome: Outcome) -> Self {
        Response {
            text: text.into(),
            outcome,
            entities: EntityMap::new(),
        }
    }

    pub(crate) fn completed(text: String, entities: EntityMap) -> Self {
        Response {
            text,
            outcome: Outcome::Completed,
            entities,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
