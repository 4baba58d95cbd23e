//! The entity catalog: named sub-grammars that patterns refer to as `{id}`.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use parlance_grammar::{EntityResolver, GrammarNode, NoEntities, compile};

use crate::intent::EntityDefinition;
use crate::value::ValueKind;

/// Predefined entities: id, pattern and value kind.
const PREDEFINED: &[(&str, &str, ValueKind)] = &[
    ("integer", "#", ValueKind::Number),
    ("hour", "#", ValueKind::Number),
    ("minute", "#", ValueKind::Number),
    (
        "time",
        "(# [x|oh] [#] [o'clock|oclock|o clock] | (quarter|half|#) past # | (quarter|#) to #) [am|pm]",
        ValueKind::Time,
    ),
    (
        "date",
        "(today | tomorrow | [the] day after tomorrow \
         | [next|this|on] (monday|tuesday|wednesday|thursday|friday|saturday|sunday) \
         | [the] # [of] (january|february|march|april|may|june|july|august|september|october|november|december))",
        ValueKind::Text,
    ),
];

static PREDEFINED_CATALOG: LazyLock<EntityCatalog> = LazyLock::new(|| {
    let mut catalog = EntityCatalog::new();
    for (id, pattern, kind) in PREDEFINED {
        let grammar = compile(pattern, &NoEntities).unwrap();
        catalog.insert(EntityDefinition::new(*id, *pattern, Arc::new(grammar), *kind));
    }
    catalog
});

/// An ordered map of entity id to [`EntityDefinition`].
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entries: IndexMap<String, EntityDefinition>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared catalog of predefined entities: `integer`, `hour`,
    /// `minute`, `time` and `date`.
    pub fn predefined() -> Self {
        PREDEFINED_CATALOG.clone()
    }

    /// Insert a definition, returning the one it shadows.
    pub fn insert(&mut self, definition: EntityDefinition) -> Option<EntityDefinition> {
        self.entries.insert(definition.id.clone(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&EntityDefinition> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityResolver for EntityCatalog {
    fn resolve(&self, id: &str) -> Option<Arc<GrammarNode>> {
        self.entries.get(id).map(|entry| entry.grammar.clone())
    }
}
