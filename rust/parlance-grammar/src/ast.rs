//! Abstract syntax tree for compiled patterns.
//!
//! A pattern like `"set [a] timer for # (minutes|seconds)"` compiles into a
//! [`GrammarNode::Sequence`] of literals, an optional, a number slot and an
//! alternation. Nodes are immutable once built and compare structurally, so
//! two compilations of the same text are equal.
//!
//! Entity references keep the resolved sub-grammar inline (shared through an
//! [`Arc`]), which lets the matcher run without a catalog at hand.

use std::fmt;
use std::sync::Arc;

/// A node of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrammarNode {
    /// A single lowercase word.
    Literal(String),
    /// Children matched one after another.
    Sequence(Vec<GrammarNode>),
    /// Branches tried in declaration order. An alternation without branches
    /// never matches.
    Alternation(Vec<GrammarNode>),
    /// The inner node, or nothing.
    Optional(Box<GrammarNode>),
    /// `+`: exactly one token.
    ShortWildcard,
    /// `*`: zero or more tokens.
    LongWildcard,
    /// `#`: one token that parses as an integer.
    NumberSlot,
    /// `{id}`: a named entity, with its grammar resolved at compile time.
    EntityReference {
        id: String,
        grammar: Arc<GrammarNode>,
    },
}

impl GrammarNode {
    /// Build a literal, lowercasing the word.
    pub fn literal(word: impl AsRef<str>) -> Self {
        GrammarNode::Literal(word.as_ref().to_lowercase())
    }

    /// Build an entity reference.
    pub fn entity(id: impl Into<String>, grammar: Arc<GrammarNode>) -> Self {
        GrammarNode::EntityReference {
            id: id.into(),
            grammar,
        }
    }

    /// Build a sequence, collapsing a single child and flattening nested
    /// sequences so that equal pattern text always yields equal trees.
    pub fn sequence(children: Vec<GrammarNode>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                GrammarNode::Sequence(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or(GrammarNode::Sequence(Vec::new()))
        } else {
            GrammarNode::Sequence(flat)
        }
    }

    /// Build an alternation, collapsing a single branch.
    pub fn alternation(mut branches: Vec<GrammarNode>) -> Self {
        if branches.len() == 1 {
            branches.pop().unwrap_or(GrammarNode::Alternation(Vec::new()))
        } else {
            GrammarNode::Alternation(branches)
        }
    }

    /// Build an optional node.
    pub fn optional(inner: GrammarNode) -> Self {
        GrammarNode::Optional(Box::new(inner))
    }

    /// Returns `true` for an alternation without branches.
    pub fn is_disabled(&self) -> bool {
        matches!(self, GrammarNode::Alternation(branches) if branches.is_empty())
    }

    /// Entity ids referenced directly by this grammar, in order of first
    /// appearance. References nested inside another entity's grammar are not
    /// included.
    pub fn entity_references(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                GrammarNode::Sequence(children) | GrammarNode::Alternation(children) => {
                    stack.extend(children.iter().rev());
                }
                GrammarNode::Optional(inner) => stack.push(inner),
                GrammarNode::EntityReference { id, .. } => {
                    if !found.contains(&id.as_str()) {
                        found.push(id);
                    }
                }
                GrammarNode::Literal(_)
                | GrammarNode::ShortWildcard
                | GrammarNode::LongWildcard
                | GrammarNode::NumberSlot => {}
            }
        }
        found
    }

    /// Returns `true` if this grammar references `id` directly.
    pub fn references(&self, id: &str) -> bool {
        self.entity_references().contains(&id)
    }
}

impl fmt::Display for GrammarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarNode::Literal(word) => write!(f, "{word}"),
            GrammarNode::Sequence(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            GrammarNode::Alternation(branches) => {
                write!(f, "(")?;
                write_branches(f, branches)?;
                write!(f, ")")
            }
            GrammarNode::Optional(inner) => {
                write!(f, "[")?;
                match inner.as_ref() {
                    GrammarNode::Alternation(branches) => write_branches(f, branches)?,
                    other => write!(f, "{other}")?,
                }
                write!(f, "]")
            }
            GrammarNode::ShortWildcard => write!(f, "+"),
            GrammarNode::LongWildcard => write!(f, "*"),
            GrammarNode::NumberSlot => write!(f, "#"),
            GrammarNode::EntityReference { id, .. } => write!(f, "{{{id}}}"),
        }
    }
}

fn write_branches(f: &mut fmt::Formatter<'_>, branches: &[GrammarNode]) -> fmt::Result {
    for (i, branch) in branches.iter().enumerate() {
        if i > 0 {
            write!(f, "|")?;
        }
        write!(f, "{branch}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_flattens_and_collapses() {
        let nested = GrammarNode::sequence(vec![
            GrammarNode::literal("a"),
            GrammarNode::sequence(vec![GrammarNode::literal("b"), GrammarNode::literal("c")]),
        ]);
        assert_eq!(
            nested,
            GrammarNode::Sequence(vec![
                GrammarNode::literal("a"),
                GrammarNode::literal("b"),
                GrammarNode::literal("c"),
            ])
        );
        assert_eq!(
            GrammarNode::sequence(vec![GrammarNode::NumberSlot]),
            GrammarNode::NumberSlot
        );
    }

    #[test]
    fn test_display() {
        let hour = Arc::new(GrammarNode::NumberSlot);
        let node = GrammarNode::sequence(vec![
            GrammarNode::literal("Wake"),
            GrammarNode::literal("me"),
            GrammarNode::optional(GrammarNode::alternation(vec![
                GrammarNode::literal("at"),
                GrammarNode::literal("by"),
            ])),
            GrammarNode::entity("hour", hour),
            GrammarNode::LongWildcard,
        ]);
        assert_eq!(node.to_string(), "wake me [at|by] {hour} *");
    }

    #[test]
    fn test_entity_references_skip_nested() {
        let inner = Arc::new(GrammarNode::entity("hour", Arc::new(GrammarNode::NumberSlot)));
        let node = GrammarNode::sequence(vec![
            GrammarNode::entity("time", inner),
            GrammarNode::optional(GrammarNode::entity("date", Arc::new(GrammarNode::ShortWildcard))),
            GrammarNode::entity("time", Arc::new(GrammarNode::NumberSlot)),
        ]);
        assert_eq!(node.entity_references(), vec!["time", "date"]);
        assert!(!node.references("hour"));
    }

    #[test]
    fn test_disabled_alternation() {
        assert!(GrammarNode::Alternation(vec![]).is_disabled());
        assert!(!GrammarNode::literal("on").is_disabled());
    }
}
