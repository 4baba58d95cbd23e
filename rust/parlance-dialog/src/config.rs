//! Engine configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "language": "english", "cancelled": "Alright, never mind." }
//! ```

use std::path::Path;

use parlance_grammar::{DEFAULT_MIN_WINDOW, Language};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Phrases and matching parameters of a [`crate::DialogEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Stemming language for tokens and literals.
    pub language: Language,
    /// Grammar recognized as "quit" while a prompt is pending.
    pub quit_pattern: String,
    /// Replies when no intent matches; one is picked at random.
    pub not_understood: Vec<String>,
    /// Reply when the user quits a pending prompt.
    pub cancelled: String,
    /// Reply when a handler fails.
    pub failed: String,
    /// Shortest sub-window the trimming fallback tries.
    pub min_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            language: Language::None,
            quit_pattern: "[please] [just] (stop|cancel|quit|abort|never mind|forget it) \
                           [it|that|this] [now|please]"
                .to_string(),
            not_understood: vec![
                "Sorry, I didn't understand that.".to_string(),
                "I'm not sure what you mean.".to_string(),
                "Could you say that again?".to_string(),
            ],
            cancelled: "Okay, cancelled.".to_string(),
            failed: "Sorry, something went wrong.".to_string(),
            min_window: DEFAULT_MIN_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.not_understood.iter().all(|phrase| phrase.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "not_understood",
                reason: "at least one phrase is required".to_string(),
            });
        }
        if self.min_window == 0 {
            return Err(ConfigError::Invalid {
                field: "min_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.quit_pattern.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "quit_pattern",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
