//! Per-conversation dialog state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parlance_grammar::GrammarNode;

use crate::intent::{IntentId, Prompt};
use crate::value::{EntityMap, EntityValue};

/// Where a conversation stands.
///
/// A session rests in [`DialogState::Idle`] or
/// [`DialogState::AwaitingSlot`]; `Selecting` and `Completed` are passed
/// through within a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Idle,
    Selecting,
    AwaitingSlot(String),
    Completed,
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogState::Idle => write!(f, "idle"),
            DialogState::Selecting => write!(f, "selecting"),
            DialogState::AwaitingSlot(entity) => write!(f, "awaiting {entity}"),
            DialogState::Completed => write!(f, "completed"),
        }
    }
}

/// The state of one conversation: at most one active intent, its entity
/// values and the entity currently being asked for.
///
/// A session must not be driven from two threads at once; distinct sessions
/// are independent.
#[derive(Debug, Clone, Default)]
pub struct DialogSession {
    pub(crate) active: Option<ActiveIntent>,
}

/// An activated intent with the grammars refreshed for this activation.
#[derive(Debug, Clone)]
pub(crate) struct ActiveIntent {
    pub(crate) intent: IntentId,
    /// Provider-backed entity grammars, rebuilt on activation.
    pub(crate) grammars: HashMap<String, Arc<GrammarNode>>,
    /// The normalized alternatives each provider returned.
    pub(crate) alternatives: HashMap<String, Vec<String>>,
    /// Prompts recompiled against the refreshed grammars.
    pub(crate) prompts: HashMap<String, Prompt>,
    pub(crate) values: EntityMap,
    pub(crate) pending: Option<String>,
}

impl ActiveIntent {
    pub(crate) fn new(intent: IntentId) -> Self {
        ActiveIntent {
            intent,
            grammars: HashMap::new(),
            alternatives: HashMap::new(),
            prompts: HashMap::new(),
            values: EntityMap::new(),
            pending: None,
        }
    }
}

impl DialogSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DialogState {
        match self.active.as_ref().and_then(|a| a.pending.as_ref()) {
            Some(entity) => DialogState::AwaitingSlot(entity.clone()),
            None => DialogState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == DialogState::Idle
    }

    /// The active intent, if any.
    pub fn intent(&self) -> Option<IntentId> {
        self.active.as_ref().map(|a| a.intent)
    }

    /// The entity the session is waiting for.
    pub fn pending_entity(&self) -> Option<&str> {
        self.active.as_ref()?.pending.as_deref()
    }

    pub fn value(&self, id: &str) -> Option<&EntityValue> {
        self.active.as_ref()?.values.get(id)
    }

    /// Values collected so far for the active intent.
    pub fn values(&self) -> Option<&EntityMap> {
        self.active.as_ref().map(|a| &a.values)
    }

    /// Drop the active intent and everything collected for it.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = DialogSession::new();
        assert_eq!(session.state(), DialogState::Idle);
        assert!(session.intent().is_none());
        assert!(session.values().is_none());
    }

    #[test]
    fn pending_entity_means_awaiting() {
        let mut active = ActiveIntent::new(IntentId(2));
        active.pending = Some("minutes".into());
        active.values.insert("label".into(), EntityValue::Text("tea".into()));
        let mut session = DialogSession {
            active: Some(active),
        };

        assert_eq!(session.state(), DialogState::AwaitingSlot("minutes".into()));
        assert_eq!(session.state().to_string(), "awaiting minutes");
        assert_eq!(session.intent(), Some(IntentId(2)));
        assert_eq!(session.value("label"), Some(&EntityValue::Text("tea".into())));

        session.reset();
        assert!(session.is_idle());
        assert!(session.pending_entity().is_none());
    }
}
