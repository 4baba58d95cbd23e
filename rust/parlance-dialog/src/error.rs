//! Error types for intent registration, dialog turns and configuration.

use std::path::PathBuf;

use parlance_grammar::CompileError;
use thiserror::Error;

/// Errors raised while registering an intent. The offending intent is
/// skipped; other registrations are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("intent '{intent}' failed to compile: {source}")]
    Compile {
        intent: String,
        #[source]
        source: CompileError,
    },

    #[error("intent '{intent}' declares entity '{entity}' more than once")]
    DuplicateEntity { intent: String, entity: String },

    #[error("intent '{intent}' has a prompt for undeclared entity '{entity}'")]
    UnknownPromptEntity { intent: String, entity: String },

    #[error("intent '{intent}' declares more than one prompt for entity '{entity}'")]
    DuplicatePrompt { intent: String, entity: String },

    #[error("intent '{intent}' has the same grammar as intent '{existing}'")]
    DuplicateGrammar { intent: String, existing: String },
}

/// Errors raised by dialog turns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    #[error("no intent is awaiting an answer")]
    NoActiveIntent,
}

/// Errors raised while loading or validating an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("quit pattern does not compile: {0}")]
    QuitPattern(#[source] CompileError),
}

/// Error type returned by intent handlers and entity providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
