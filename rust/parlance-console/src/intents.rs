use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use parlance_dialog::{
    EntityMap, IntentHandler, IntentRegistry, IntentSpec, handler_fn,
};

/// The demo intents shipped with the console.
pub const DEFAULT_MANIFEST: &str = include_str!("../intents.json");

/// Devices the demo `switch` intent can address.
pub const DEMO_DEVICES: &[&str] = &["kitchen light", "desk lamp", "radio"];

fn text(entities: &EntityMap, id: &str) -> String {
    entities.get(id).map(ToString::to_string).unwrap_or_default()
}

/// Handlers for the demo intents, keyed by intent name.
pub fn demo_handlers() -> HashMap<&'static str, Arc<dyn IntentHandler>> {
    let mut handlers: HashMap<&'static str, Arc<dyn IntentHandler>> = HashMap::new();
    handlers.insert(
        "alarm",
        Arc::new(handler_fn(|entities: &EntityMap| {
            Ok(format!("Alarm set for {}.", text(entities, "wake")))
        })),
    );
    handlers.insert(
        "timer",
        Arc::new(handler_fn(|entities: &EntityMap| {
            match entities.get("minutes").and_then(|m| m.as_number()) {
                Some(1) => Ok("Timer set for 1 minute.".to_string()),
                Some(n) if n > 0 => Ok(format!("Timer set for {n} minutes.")),
                _ => Err("a timer needs at least one minute".into()),
            }
        })),
    );
    handlers.insert(
        "switch",
        Arc::new(handler_fn(|entities: &EntityMap| {
            Ok(format!(
                "Switching {} {}.",
                text(entities, "device"),
                text(entities, "state")
            ))
        })),
    );
    handlers.insert(
        "greet",
        Arc::new(handler_fn(|_: &EntityMap| Ok("Hello!".to_string()))),
    );
    handlers
}

/// The outcome of loading a manifest.
#[derive(Debug)]
pub struct LoadedIntents {
    /// Every intent that registered.
    pub registry: IntentRegistry,
    /// Names of manifest intents that were left out.
    pub skipped: Vec<String>,
}

/// Build a registry from a JSON manifest, binding each intent to the
/// handler of the same name. The `device` entity gets the demo device list
/// as its provider. Intents without a handler or that fail to compile are
/// skipped and reported in [`LoadedIntents::skipped`].
pub fn load_registry(
    manifest: &str,
    handlers: &HashMap<&'static str, Arc<dyn IntentHandler>>,
) -> Result<LoadedIntents> {
    let specs: Vec<IntentSpec> =
        serde_json::from_str(manifest).context("failed to parse intent manifest")?;

    let mut registry = IntentRegistry::new();
    let mut skipped = Vec::new();
    for mut spec in specs {
        let Some(handler) = handlers.get(spec.name.as_str()) else {
            tracing::warn!(intent = %spec.name, "no handler for intent, skipping");
            skipped.push(spec.name);
            continue;
        };
        if let Some(device) = spec.entity_mut("device") {
            let devices: Vec<String> = DEMO_DEVICES.iter().map(|d| d.to_string()).collect();
            device.provider = Some(Arc::new(devices));
        }
        let name = spec.name.clone();
        // The registry logs the reason.
        if registry.register(handler.clone(), spec).is_err() {
            skipped.push(name);
        }
    }

    Ok(LoadedIntents { registry, skipped })
}
