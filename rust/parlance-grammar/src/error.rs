//! Error types for the pattern compiler.

use thiserror::Error;

/// Errors that can occur while compiling a pattern into a [`crate::ast::GrammarNode`].
///
/// Every variant except [`CompileError::Empty`] carries the pattern text and
/// the byte offset of the offending construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("pattern is empty")]
    Empty,

    #[error("unknown entity `{id}` at offset {position} in `{pattern}`")]
    UnknownEntity {
        id: String,
        position: usize,
        pattern: String,
    },

    #[error("unbalanced `{delimiter}` at offset {position} in `{pattern}`")]
    Unbalanced {
        delimiter: char,
        position: usize,
        pattern: String,
    },

    #[error("expected {expected}, found {found} at offset {position} in `{pattern}`")]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
        pattern: String,
    },

    #[error("empty group at offset {position} in `{pattern}`")]
    EmptyGroup { position: usize, pattern: String },

    #[error("invalid entity name `{name}` at offset {position} in `{pattern}`")]
    InvalidEntityName {
        name: String,
        position: usize,
        pattern: String,
    },
}

impl CompileError {
    /// The byte offset of the error within the pattern, if it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            CompileError::Empty => None,
            CompileError::UnknownEntity { position, .. }
            | CompileError::Unbalanced { position, .. }
            | CompileError::Unexpected { position, .. }
            | CompileError::EmptyGroup { position, .. }
            | CompileError::InvalidEntityName { position, .. } => Some(*position),
        }
    }
}
