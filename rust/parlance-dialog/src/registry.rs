//! The intent registry: compiled root grammars bound to their handlers.

use std::sync::Arc;

use parlance_grammar::{GrammarNode, compile};

use crate::catalog::EntityCatalog;
use crate::error::RegistrationError;
use crate::handler::IntentHandler;
use crate::intent::{EntityDefinition, IntentDefinition, IntentId, IntentSpec, Prompt};

/// Registered intents in registration order.
///
/// Registration happens once, up front; afterwards the registry is only read
/// and can be shared across threads.
#[derive(Debug, Clone)]
pub struct IntentRegistry {
    catalog: EntityCatalog,
    intents: Vec<IntentDefinition>,
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentRegistry {
    /// A registry over the predefined entity catalog.
    pub fn new() -> Self {
        Self::with_catalog(EntityCatalog::predefined())
    }

    /// A registry whose intents resolve entities against `catalog` in
    /// addition to their own templates.
    pub fn with_catalog(catalog: EntityCatalog) -> Self {
        IntentRegistry {
            catalog,
            intents: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Compile and register an intent.
    ///
    /// On failure the intent is skipped and the error is logged and
    /// returned; the registry is left unchanged.
    pub fn register<H>(&mut self, handler: H, spec: IntentSpec) -> Result<IntentId, RegistrationError>
    where
        H: IntentHandler + 'static,
    {
        match self.build(Arc::new(handler), &spec) {
            Ok(definition) => {
                let id = definition.id;
                tracing::debug!(intent = %spec.name, %id, grammar = %definition.grammar, "registered intent");
                self.intents.push(definition);
                Ok(id)
            }
            Err(error) => {
                tracing::warn!(intent = %spec.name, %error, "skipping intent");
                Err(error)
            }
        }
    }

    fn build(
        &self,
        handler: Arc<dyn IntentHandler>,
        spec: &IntentSpec,
    ) -> Result<IntentDefinition, RegistrationError> {
        let compile_error = |source| RegistrationError::Compile {
            intent: spec.name.clone(),
            source,
        };

        let mut scope = self.catalog.clone();
        let mut entities: Vec<EntityDefinition> = Vec::with_capacity(spec.entities.len());

        for template in &spec.entities {
            if entities.iter().any(|e| e.id == template.id) {
                return Err(RegistrationError::DuplicateEntity {
                    intent: spec.name.clone(),
                    entity: template.id.clone(),
                });
            }
            let grammar = compile(&template.pattern, &scope).map_err(compile_error)?;
            let mut definition = EntityDefinition::new(
                &template.id,
                &template.pattern,
                Arc::new(grammar),
                template.kind,
            );
            definition.required = template.required;
            definition.provider = template.provider.clone();
            scope.insert(definition.clone());
            entities.push(definition);
        }

        for template in &spec.prompts {
            let Some(index) = entities.iter().position(|e| e.id == template.entity) else {
                return Err(RegistrationError::UnknownPromptEntity {
                    intent: spec.name.clone(),
                    entity: template.entity.clone(),
                });
            };
            if entities[index].prompt.is_some() {
                return Err(RegistrationError::DuplicatePrompt {
                    intent: spec.name.clone(),
                    entity: template.entity.clone(),
                });
            }
            let grammar = compile(&template.pattern, &scope).map_err(compile_error)?;
            entities[index].prompt = Some(Prompt {
                entity: template.entity.clone(),
                pattern: template.pattern.clone(),
                grammar: Arc::new(grammar),
                text: template.text.clone(),
            });
        }

        for definition in entities.iter_mut().filter(|e| e.required && e.prompt.is_none()) {
            let pattern = format!("{{{}}}", definition.id);
            let grammar = compile(&pattern, &scope).map_err(compile_error)?;
            definition.prompt = Some(Prompt {
                entity: definition.id.clone(),
                pattern,
                grammar: Arc::new(grammar),
                text: format!("What is the {}?", definition.id),
            });
        }

        let grammar = compile(&spec.pattern, &scope).map_err(compile_error)?;

        for id in grammar.entity_references() {
            if entities.iter().any(|e| e.id == id) {
                continue;
            }
            if let Some(predefined) = self.catalog.get(id) {
                entities.push(predefined.clone());
            }
        }

        if let Some(existing) = self.intents.iter().find(|i| *i.grammar == grammar) {
            return Err(RegistrationError::DuplicateGrammar {
                intent: spec.name.clone(),
                existing: existing.name.clone(),
            });
        }

        Ok(IntentDefinition {
            id: IntentId(self.intents.len()),
            name: spec.name.clone(),
            grammar: Arc::new(grammar),
            entities,
            scope,
            handler,
        })
    }

    /// The handler bound to a root grammar.
    pub fn lookup(&self, grammar: &GrammarNode) -> Option<&Arc<dyn IntentHandler>> {
        self.intents
            .iter()
            .find(|i| *i.grammar == *grammar)
            .map(|i| &i.handler)
    }

    pub fn intent(&self, id: IntentId) -> Option<&IntentDefinition> {
        self.intents.get(id.0)
    }

    /// The intent registered under `name`.
    pub fn find(&self, name: &str) -> Option<&IntentDefinition> {
        self.intents.iter().find(|i| i.name == name)
    }

    pub fn intents(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter()
    }

    /// Root grammars in registration order. The iterator is cheap to clone,
    /// so callers can restart it.
    pub fn list_grammars(&self) -> Grammars<'_> {
        Grammars {
            inner: self.intents.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Iterator over registered root grammars. See [`IntentRegistry::list_grammars`].
#[derive(Debug, Clone)]
pub struct Grammars<'a> {
    inner: std::slice::Iter<'a, IntentDefinition>,
}

impl<'a> Iterator for Grammars<'a> {
    type Item = &'a Arc<GrammarNode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|intent| &intent.grammar)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Grammars<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::intent::{EntityTemplate, PromptTemplate};
    use crate::value::ValueKind;
    use parlance_grammar::CompileError;
    use pretty_assertions::assert_eq;

    fn ok(text: &'static str) -> impl IntentHandler {
        handler_fn(move |_| Ok(text.to_string()))
    }

    #[test]
    fn register_inlines_entities() {
        let mut registry = IntentRegistry::new();
        let id = registry
            .register(
                ok("done"),
                IntentSpec::new("timer", "set [a] timer for {minutes} minutes")
                    .entity(EntityTemplate::new("minutes", "#").kind(ValueKind::Number).required()),
            )
            .unwrap();

        let intent = registry.intent(id).unwrap();
        assert_eq!(intent.name(), "timer");
        assert_eq!(
            intent.grammar().to_string(),
            "set [a] timer for {minutes} minutes"
        );
        assert_eq!(intent.entities().len(), 1);

        let prompt = intent.entity("minutes").unwrap().prompt.as_ref().unwrap();
        assert_eq!(prompt.text, "What is the minutes?");
        assert_eq!(prompt.pattern, "{minutes}");
    }

    #[test]
    fn predefined_references_become_optional_entities() {
        let mut registry = IntentRegistry::new();
        let id = registry
            .register(ok("done"), IntentSpec::new("alarm", "wake me [up] at {time}"))
            .unwrap();

        let time = registry.intent(id).unwrap().entity("time").unwrap();
        assert_eq!(time.kind, ValueKind::Time);
        assert!(!time.required);
    }

    #[test]
    fn templates_shadow_predefined_entities() {
        let mut registry = IntentRegistry::new();
        let id = registry
            .register(
                ok("done"),
                IntentSpec::new("note", "note {date}").entity(EntityTemplate::new("date", "*")),
            )
            .unwrap();
        let date = registry.intent(id).unwrap().entity("date").unwrap();
        assert_eq!(*date.grammar, GrammarNode::LongWildcard);
    }

    #[test]
    fn compile_errors_skip_only_the_offending_intent() {
        let mut registry = IntentRegistry::new();

        let error = registry
            .register(ok("bad"), IntentSpec::new("broken", "play {song"))
            .unwrap_err();
        assert!(matches!(
            error,
            RegistrationError::Compile {
                source: CompileError::Unbalanced { delimiter: '{', .. },
                ..
            }
        ));

        let error = registry
            .register(ok("bad"), IntentSpec::new("unknown", "call {contact}"))
            .unwrap_err();
        assert!(matches!(
            error,
            RegistrationError::Compile {
                source: CompileError::UnknownEntity { .. },
                ..
            }
        ));

        registry
            .register(ok("fine"), IntentSpec::new("hello", "hello"))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.intent(IntentId(0)).unwrap().name(), "hello");
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let mut registry = IntentRegistry::new();

        let error = registry
            .register(
                ok("x"),
                IntentSpec::new("twice", "say {word}")
                    .entity(EntityTemplate::new("word", "+"))
                    .entity(EntityTemplate::new("word", "*")),
            )
            .unwrap_err();
        assert_eq!(
            error,
            RegistrationError::DuplicateEntity {
                intent: "twice".into(),
                entity: "word".into()
            }
        );

        let error = registry
            .register(
                ok("x"),
                IntentSpec::new("orphan", "say +").prompt(PromptTemplate::new("word", "+", "What?")),
            )
            .unwrap_err();
        assert!(matches!(error, RegistrationError::UnknownPromptEntity { .. }));

        let error = registry
            .register(
                ok("x"),
                IntentSpec::new("asked", "say {word}")
                    .entity(EntityTemplate::new("word", "+").required())
                    .prompt(PromptTemplate::new("word", "{word}", "What?"))
                    .prompt(PromptTemplate::new("word", "{word}", "Which?")),
            )
            .unwrap_err();
        assert!(matches!(error, RegistrationError::DuplicatePrompt { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_grammar_keeps_first_registration() {
        let mut registry = IntentRegistry::new();
        registry
            .register(ok("first"), IntentSpec::new("first", "turn (on|off) [the] lights"))
            .unwrap();
        let error = registry
            .register(ok("second"), IntentSpec::new("second", "turn (on | off)  [the] lights"))
            .unwrap_err();
        assert_eq!(
            error,
            RegistrationError::DuplicateGrammar {
                intent: "second".into(),
                existing: "first".into()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_and_list_grammars() {
        let mut registry = IntentRegistry::new();
        registry.register(ok("a"), IntentSpec::new("a", "first command")).unwrap();
        registry.register(ok("b"), IntentSpec::new("b", "second command")).unwrap();

        let grammars = registry.list_grammars();
        let rendered: Vec<String> = grammars.clone().map(|g| g.to_string()).collect();
        assert_eq!(rendered, vec!["first command", "second command"]);
        assert_eq!(grammars.count(), 2);

        let second = registry.list_grammars().nth(1).unwrap().clone();
        let handler = registry.lookup(&second).unwrap();
        assert_eq!(handler.handle(&Default::default()).unwrap(), "b");
        assert!(registry.lookup(&GrammarNode::literal("nothing")).is_none());
    }
}
