//! Intent declarations and their compiled form.
//!
//! An [`IntentSpec`] is what a host supplies: a root pattern, entity
//! templates and prompts, usually deserialized from a manifest. Registering
//! it with a handler produces an [`IntentDefinition`] with every pattern
//! compiled.

use std::fmt;
use std::sync::Arc;

use parlance_grammar::GrammarNode;
use serde::{Deserialize, Serialize};

use crate::catalog::EntityCatalog;
use crate::handler::{EntityProvider, IntentHandler};
use crate::value::ValueKind;

/// A declared intent, before compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub entities: Vec<EntityTemplate>,
    #[serde(default)]
    pub prompts: Vec<PromptTemplate>,
}

impl IntentSpec {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        IntentSpec {
            name: name.into(),
            pattern: pattern.into(),
            entities: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn entity(mut self, entity: EntityTemplate) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompts.push(prompt);
        self
    }

    /// The template for entity `id`, if declared.
    pub fn entity_mut(&mut self, id: &str) -> Option<&mut EntityTemplate> {
        self.entities.iter_mut().find(|e| e.id == id)
    }
}

/// A declared entity of an intent.
#[derive(Clone, Serialize, Deserialize)]
pub struct EntityTemplate {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub kind: ValueKind,
    /// Live alternatives, queried every time the intent is activated. The
    /// pattern is used until the first refresh.
    #[serde(skip)]
    pub provider: Option<Arc<dyn EntityProvider>>,
}

impl EntityTemplate {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        EntityTemplate {
            id: id.into(),
            pattern: pattern.into(),
            required: false,
            kind: ValueKind::default(),
            provider: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_provider(mut self, provider: impl EntityProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }
}

impl fmt::Debug for EntityTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityTemplate")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// A declared prompt: the question asked for an entity and the grammar its
/// answer must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub entity: String,
    pub pattern: String,
    pub text: String,
}

impl PromptTemplate {
    pub fn new(
        entity: impl Into<String>,
        pattern: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        PromptTemplate {
            entity: entity.into(),
            pattern: pattern.into(),
            text: text.into(),
        }
    }
}

/// A compiled prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub entity: String,
    pub pattern: String,
    pub grammar: Arc<GrammarNode>,
    pub text: String,
}

/// A compiled entity.
#[derive(Clone)]
pub struct EntityDefinition {
    pub id: String,
    pub pattern: String,
    pub grammar: Arc<GrammarNode>,
    pub kind: ValueKind,
    pub required: bool,
    pub prompt: Option<Prompt>,
    pub provider: Option<Arc<dyn EntityProvider>>,
}

impl EntityDefinition {
    /// A non-required entity without prompt or provider.
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        grammar: Arc<GrammarNode>,
        kind: ValueKind,
    ) -> Self {
        EntityDefinition {
            id: id.into(),
            pattern: pattern.into(),
            grammar,
            kind,
            required: false,
            prompt: None,
            provider: None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.provider.is_some()
    }
}

impl fmt::Debug for EntityDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDefinition")
            .field("id", &self.id)
            .field("grammar", &self.grammar.to_string())
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("prompt", &self.prompt.as_ref().map(|p| &p.text))
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// Index of a registered intent, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentId(pub usize);

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered intent: handler, compiled root grammar and entities.
#[derive(Clone)]
pub struct IntentDefinition {
    pub(crate) id: IntentId,
    pub(crate) name: String,
    pub(crate) grammar: Arc<GrammarNode>,
    pub(crate) entities: Vec<EntityDefinition>,
    pub(crate) scope: EntityCatalog,
    pub(crate) handler: Arc<dyn IntentHandler>,
}

impl IntentDefinition {
    pub fn id(&self) -> IntentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root grammar, with entity references resolved.
    pub fn grammar(&self) -> &Arc<GrammarNode> {
        &self.grammar
    }

    /// Entities in declaration order, followed by predefined entities the
    /// root pattern refers to.
    pub fn entities(&self) -> &[EntityDefinition] {
        &self.entities
    }

    pub fn entity(&self, id: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// The catalog the intent's patterns were compiled against.
    pub fn scope(&self) -> &EntityCatalog {
        &self.scope
    }

    pub fn handler(&self) -> &Arc<dyn IntentHandler> {
        &self.handler
    }
}

impl fmt::Debug for IntentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("grammar", &self.grammar.to_string())
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}
