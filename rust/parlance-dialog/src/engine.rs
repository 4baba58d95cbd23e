//! The dialog engine.
//!
//! ```text
//! Idle ──decide_intent──▶ Selecting ──all required known──▶ Completed ──▶ Idle
//!                             │
//!                             └──missing entity──▶ AwaitingSlot(id)
//!                                                   │  answer: next slot or Completed
//!                                                   │  quit:   Idle
//!                                                   └  other:  same prompt again
//! ```
//!
//! Matching, typing and prompting all happen synchronously on the caller's
//! thread. The engine itself is immutable; every piece of conversation state
//! lives in the [`DialogSession`] passed to each turn.

use std::collections::HashMap;
use std::sync::Arc;

use parlance_grammar::{EntityResolver, GrammarNode, Matcher, Token, Tokenizer, compile};
use rand::seq::SliceRandom;

use crate::catalog::EntityCatalog;
use crate::config::EngineConfig;
use crate::error::{ConfigError, DialogError};
use crate::intent::{EntityDefinition, IntentDefinition, IntentId, Prompt};
use crate::registry::{Grammars, IntentRegistry};
use crate::response::{Outcome, Response};
use crate::session::{ActiveIntent, DialogSession, DialogState};
use crate::value::{EntityMap, EntityValue, parse_value};

/// Drives conversations against a fixed set of registered intents.
#[derive(Debug)]
pub struct DialogEngine {
    registry: IntentRegistry,
    tokenizer: Tokenizer,
    matcher: Matcher,
    quit: Arc<GrammarNode>,
    config: EngineConfig,
}

impl DialogEngine {
    /// Build an engine. The quit pattern is compiled here, once.
    pub fn new(registry: IntentRegistry, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let quit = compile(&config.quit_pattern, registry.catalog())
            .map_err(ConfigError::QuitPattern)?;

        Ok(DialogEngine {
            tokenizer: Tokenizer::new(config.language),
            matcher: Matcher::new(config.language).with_min_window(config.min_window),
            quit: Arc::new(quit),
            registry,
            config,
        })
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Every root grammar the engine can recognize, in registration order.
    pub fn possible_grammars(&self) -> Grammars<'_> {
        self.registry.list_grammars()
    }

    /// Handle an utterance: answer the pending prompt if there is one,
    /// otherwise select a new intent.
    pub fn respond(&self, session: &mut DialogSession, text: &str) -> Response {
        match self.process_intent(session, text) {
            Ok(response) => response,
            Err(DialogError::NoActiveIntent) => self.decide_intent(session, text),
        }
    }

    /// Select an intent for `text`, discarding whatever the session held.
    ///
    /// Captured entities are typed and stored. If every required entity is
    /// then known the handler runs once; otherwise the first missing
    /// entity's prompt is returned and the session waits for the answer.
    pub fn decide_intent(&self, session: &mut DialogSession, text: &str) -> Response {
        session.reset();
        tracing::debug!(state = %DialogState::Selecting, %text, "selecting intent");

        let tokens = self.tokenizer.tokenize(text);
        let roots: Vec<&GrammarNode> = self.registry.list_grammars().map(|g| g.as_ref()).collect();

        let Some(found) = self.matcher.find(&roots, &tokens) else {
            tracing::debug!(%text, "no intent matched");
            return self.not_understood();
        };
        let Some(intent) = self.registry.intent(IntentId(found.candidate)) else {
            return self.not_understood();
        };
        tracing::debug!(intent = %intent.name(), window = ?found.window, "intent selected");

        let mut active = ActiveIntent::new(intent.id());
        self.refresh(intent, &mut active);

        for definition in intent.entities() {
            let Some(span) = found.entity_span(&definition.id) else {
                continue;
            };
            if let Some(value) = self.bind(definition, &active, &tokens[span]) {
                active.values.insert(definition.id.clone(), value);
            }
        }

        for definition in intent.entities() {
            if !definition.required || active.values.contains_key(&definition.id) {
                continue;
            }
            if let Some([only]) = active.alternatives.get(&definition.id).map(Vec::as_slice) {
                let tokens = self.tokenizer.tokenize(only);
                if let Some(value) = parse_value(definition.kind, &tokens) {
                    tracing::debug!(entity = %definition.id, %value, "filled from single alternative");
                    active.values.insert(definition.id.clone(), value);
                }
            }
        }

        self.advance(session, intent, active)
    }

    /// Answer the pending prompt.
    ///
    /// A recognized quit phrase cancels the intent. An answer that matches
    /// the prompt's grammar and parses is stored, and the engine moves on to
    /// the next missing entity or completes. Anything else repeats the same
    /// prompt.
    pub fn process_intent(
        &self,
        session: &mut DialogSession,
        text: &str,
    ) -> Result<Response, DialogError> {
        let Some(current) = session.active.as_ref() else {
            return Err(DialogError::NoActiveIntent);
        };
        let Some(pending) = current.pending.clone() else {
            return Err(DialogError::NoActiveIntent);
        };
        let Some(intent) = self.registry.intent(current.intent) else {
            return Err(DialogError::NoActiveIntent);
        };
        let (Some(definition), Some(prompt)) = (
            intent.entity(&pending),
            prompt_for(intent, current, &pending).cloned(),
        ) else {
            return Err(DialogError::NoActiveIntent);
        };
        let Some(mut active) = session.active.take() else {
            return Err(DialogError::NoActiveIntent);
        };

        let tokens = self.tokenizer.tokenize(text);
        let candidates = [self.quit.as_ref(), prompt.grammar.as_ref()];

        let Some(found) = self.matcher.find(&candidates, &tokens) else {
            tracing::debug!(entity = %pending, %text, "answer did not match prompt");
            return Ok(self.reprompt(session, active, prompt));
        };

        if found.candidate == 0 {
            tracing::debug!(
                intent = %intent.name(),
                entity = %pending,
                state = %DialogState::Idle,
                "intent cancelled"
            );
            return Ok(Response::new(self.config.cancelled.clone(), Outcome::Cancelled));
        }

        let span = if prompt.grammar.references(&pending) {
            found.entity_span(&pending)
        } else {
            Some(found.window.clone())
        };
        let value = span.and_then(|span| self.bind(definition, &active, &tokens[span]));

        match value {
            Some(value) => {
                tracing::debug!(entity = %pending, %value, "slot filled");
                active.values.insert(pending, value);
                active.pending = None;
                Ok(self.advance(session, intent, active))
            }
            None => {
                tracing::debug!(entity = %pending, %text, "answer did not parse");
                Ok(self.reprompt(session, active, prompt))
            }
        }
    }

    /// Re-query the providers of the session's active intent and rebuild
    /// the affected entity grammars and prompts. Does nothing when idle.
    pub fn update_grammars(&self, session: &mut DialogSession) {
        let Some(active) = session.active.as_mut() else {
            return;
        };
        if let Some(intent) = self.registry.intent(active.intent) {
            self.refresh(intent, active);
        }
    }

    fn refresh(&self, intent: &IntentDefinition, active: &mut ActiveIntent) {
        active.grammars.clear();
        active.alternatives.clear();
        active.prompts.clear();

        for definition in intent.entities() {
            let Some(provider) = &definition.provider else {
                continue;
            };

            let offered = provider.alternatives().unwrap_or_else(|error| {
                tracing::warn!(
                    intent = %intent.name(),
                    entity = %definition.id,
                    %error,
                    "entity provider failed"
                );
                Vec::new()
            });

            let mut branches: Vec<GrammarNode> = Vec::new();
            let mut kept = Vec::new();
            for alternative in offered {
                let words: Vec<GrammarNode> = self
                    .tokenizer
                    .tokenize(&alternative)
                    .iter()
                    .map(|token| GrammarNode::literal(&token.text))
                    .collect();
                if words.is_empty() {
                    continue;
                }
                let branch = GrammarNode::sequence(words);
                if !branches.contains(&branch) {
                    branches.push(branch);
                    kept.push(alternative);
                }
            }

            tracing::debug!(
                entity = %definition.id,
                alternatives = branches.len(),
                "refreshed entity grammar"
            );
            active.grammars.insert(
                definition.id.clone(),
                Arc::new(GrammarNode::alternation(branches)),
            );
            active.alternatives.insert(definition.id.clone(), kept);
        }

        if active.grammars.is_empty() {
            return;
        }

        let resolver = Refreshed {
            grammars: &active.grammars,
            scope: intent.scope(),
        };
        for definition in intent.entities() {
            let Some(prompt) = &definition.prompt else {
                continue;
            };
            if !active.grammars.keys().any(|id| prompt.grammar.references(id)) {
                continue;
            }
            match compile(&prompt.pattern, &resolver) {
                Ok(grammar) => {
                    active.prompts.insert(
                        definition.id.clone(),
                        Prompt {
                            grammar: Arc::new(grammar),
                            ..prompt.clone()
                        },
                    );
                }
                Err(error) => {
                    tracing::warn!(entity = %definition.id, %error, "prompt failed to recompile");
                }
            }
        }
    }

    /// Type a captured span. Spans of provider-backed entities must match
    /// the refreshed grammar.
    fn bind(
        &self,
        definition: &EntityDefinition,
        active: &ActiveIntent,
        tokens: &[Token],
    ) -> Option<EntityValue> {
        if let Some(grammar) = active.grammars.get(&definition.id) {
            if self.matcher.matches_exactly(grammar, tokens).is_none() {
                tracing::debug!(entity = %definition.id, "captured text is not a current alternative");
                return None;
            }
        }
        parse_value(definition.kind, tokens)
    }

    fn advance(
        &self,
        session: &mut DialogSession,
        intent: &IntentDefinition,
        mut active: ActiveIntent,
    ) -> Response {
        let missing = intent
            .entities()
            .iter()
            .find(|d| d.required && !active.values.contains_key(&d.id));

        let Some(definition) = missing else {
            return self.complete(session, intent, active.values);
        };

        let text = match prompt_for(intent, &active, &definition.id) {
            Some(prompt) => prompt.text.clone(),
            None => format!("What is the {}?", definition.id),
        };
        active.pending = Some(definition.id.clone());
        tracing::debug!(
            intent = %intent.name(),
            state = %DialogState::AwaitingSlot(definition.id.clone()),
            "prompting"
        );
        session.active = Some(active);
        Response::new(text, Outcome::Prompted)
    }

    fn complete(
        &self,
        session: &mut DialogSession,
        intent: &IntentDefinition,
        values: EntityMap,
    ) -> Response {
        session.reset();
        tracing::debug!(intent = %intent.name(), state = %DialogState::Completed, "invoking handler");

        match intent.handler().handle(&values) {
            Ok(text) => Response::completed(text, values),
            Err(error) => {
                tracing::warn!(intent = %intent.name(), %error, "intent handler failed");
                Response::new(self.config.failed.clone(), Outcome::Failed)
            }
        }
    }

    fn reprompt(&self, session: &mut DialogSession, active: ActiveIntent, prompt: Prompt) -> Response {
        session.active = Some(active);
        Response::new(prompt.text, Outcome::Prompted)
    }

    fn not_understood(&self) -> Response {
        let text = self
            .config
            .not_understood
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        Response::new(text, Outcome::NotUnderstood)
    }
}

fn prompt_for<'a>(
    intent: &'a IntentDefinition,
    active: &'a ActiveIntent,
    entity: &str,
) -> Option<&'a Prompt> {
    active
        .prompts
        .get(entity)
        .or_else(|| intent.entity(entity)?.prompt.as_ref())
}

/// Entity grammars refreshed for one activation, falling back to the
/// intent's compile scope.
struct Refreshed<'a> {
    grammars: &'a HashMap<String, Arc<GrammarNode>>,
    scope: &'a EntityCatalog,
}

impl EntityResolver for Refreshed<'_> {
    fn resolve(&self, id: &str) -> Option<Arc<GrammarNode>> {
        self.grammars
            .get(id)
            .cloned()
            .or_else(|| self.scope.resolve(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::intent::{EntityTemplate, IntentSpec};
    use crate::value::ValueKind;

    fn engine() -> DialogEngine {
        let mut registry = IntentRegistry::new();
        registry
            .register(
                handler_fn(|_| Ok("Hello!".to_string())),
                IntentSpec::new("greet", "(hello|hi) [there]"),
            )
            .unwrap();
        registry
            .register(
                handler_fn(|values: &EntityMap| Ok(format!("Timer for {}", values["minutes"]))),
                IntentSpec::new("timer", "set [a] timer [for {minutes} minutes]")
                    .entity(EntityTemplate::new("minutes", "#").kind(ValueKind::Number).required()),
            )
            .unwrap();
        DialogEngine::new(registry, EngineConfig::default()).unwrap()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<DialogEngine>();
        assert_send_sync::<IntentRegistry>();
    }

    #[test]
    fn completes_without_prompting() {
        let engine = engine();
        let mut session = DialogSession::new();
        let response = engine.decide_intent(&mut session, "hi there");
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.text, "Hello!");
        assert!(session.is_idle());
    }

    #[test]
    fn prompts_then_completes() {
        let engine = engine();
        let mut session = DialogSession::new();

        let response = engine.decide_intent(&mut session, "set a timer");
        assert_eq!(response.outcome, Outcome::Prompted);
        assert_eq!(response.text, "What is the minutes?");
        assert_eq!(session.state(), DialogState::AwaitingSlot("minutes".into()));

        let response = engine.process_intent(&mut session, "twenty").unwrap();
        assert_eq!(response.text, "Timer for 20");
        assert_eq!(response.entities["minutes"], EntityValue::Number(20));
        assert!(session.is_idle());
    }

    #[test]
    fn process_intent_requires_pending_prompt() {
        let engine = engine();
        let mut session = DialogSession::new();
        assert_eq!(
            engine.process_intent(&mut session, "ten"),
            Err(DialogError::NoActiveIntent)
        );
    }

    #[test]
    fn failed_lookup_keeps_the_session() {
        let engine = engine();
        let mut active = ActiveIntent::new(IntentId(7));
        active.pending = Some("minutes".into());
        let mut session = DialogSession {
            active: Some(active),
        };

        assert_eq!(
            engine.process_intent(&mut session, "ten"),
            Err(DialogError::NoActiveIntent)
        );
        assert_eq!(session.state(), DialogState::AwaitingSlot("minutes".into()));
        assert_eq!(session.intent(), Some(IntentId(7)));
    }

    #[test]
    fn not_understood_stays_idle() {
        let engine = engine();
        let mut session = DialogSession::new();
        let response = engine.decide_intent(&mut session, "purple monkey dishwasher");
        assert_eq!(response.outcome, Outcome::NotUnderstood);
        assert!(engine.config().not_understood.contains(&response.text));
        assert!(session.is_idle());
    }

    #[test]
    fn respond_dispatches_on_state() {
        let engine = engine();
        let mut session = DialogSession::new();
        assert_eq!(engine.respond(&mut session, "set timer").outcome, Outcome::Prompted);
        assert_eq!(engine.respond(&mut session, "5").outcome, Outcome::Completed);
        assert_eq!(engine.respond(&mut session, "hello").outcome, Outcome::Completed);
    }

    #[test]
    fn invalid_quit_pattern() {
        let config = EngineConfig {
            quit_pattern: "(stop".into(),
            ..EngineConfig::default()
        };
        let error = DialogEngine::new(IntentRegistry::new(), config).unwrap_err();
        assert!(matches!(error, ConfigError::QuitPattern(_)));
    }
}
