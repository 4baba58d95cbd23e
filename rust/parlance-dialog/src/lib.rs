//! # parlance-dialog
//!
//! Intents, entities and the slot-filling conversation built on top of
//! [`parlance_grammar`].
//!
//! A host registers intents (a root pattern, entity templates, prompts and a
//! handler) with an [`IntentRegistry`], builds a [`DialogEngine`] from it and
//! then feeds utterances through a [`DialogSession`] per conversation:
//!
//! ```
//! use parlance_dialog::{
//!     DialogEngine, DialogSession, EngineConfig, EntityTemplate, IntentRegistry, IntentSpec,
//!     Outcome, ValueKind, handler_fn,
//! };
//!
//! let mut registry = IntentRegistry::new();
//! registry
//!     .register(
//!         handler_fn(|entities| Ok(format!("Alarm set for {}", entities["wake"]))),
//!         IntentSpec::new("alarm", "wake me [up] [at {wake}]")
//!             .entity(EntityTemplate::new("wake", "{time}").kind(ValueKind::Time).required()),
//!     )
//!     .unwrap();
//!
//! let engine = DialogEngine::new(registry, EngineConfig::default()).unwrap();
//! let mut session = DialogSession::new();
//!
//! let reply = engine.respond(&mut session, "please wake me up");
//! assert_eq!(reply.outcome, Outcome::Prompted);
//!
//! let reply = engine.respond(&mut session, "half past six");
//! assert_eq!(reply.text, "Alarm set for 06:30");
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod intent;
pub mod registry;
pub mod response;
pub mod session;
pub mod value;

pub use parlance_grammar as grammar;

pub use catalog::EntityCatalog;
pub use config::EngineConfig;
pub use engine::DialogEngine;
pub use error::{BoxError, ConfigError, DialogError, RegistrationError};
pub use handler::{EntityProvider, IntentHandler, handler_fn, provider_fn};
pub use intent::{
    EntityDefinition, EntityTemplate, IntentDefinition, IntentId, IntentSpec, Prompt,
    PromptTemplate,
};
pub use registry::{Grammars, IntentRegistry};
pub use response::{Outcome, Response};
pub use session::{DialogSession, DialogState};
pub use value::{EntityMap, EntityValue, ValueKind, parse_number, parse_time};
