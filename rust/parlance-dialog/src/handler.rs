//! Caller-supplied callables: intent handlers and entity providers.
//!
//! Both run synchronously on the thread driving the dialog turn. Their
//! failures are caught per call by the engine, logged, and never end the
//! session abnormally.

use std::sync::Arc;

use crate::error::BoxError;
use crate::value::EntityMap;

/// Performs an intent once all of its required entities are known.
pub trait IntentHandler: Send + Sync {
    /// Handle a completed intent and return the text to present.
    fn handle(&self, entities: &EntityMap) -> Result<String, BoxError>;
}

/// Supplies the literal alternatives currently valid for an entity, such as
/// the names of reachable devices.
pub trait EntityProvider: Send + Sync {
    fn alternatives(&self) -> Result<Vec<String>, BoxError>;
}

impl<H: IntentHandler + ?Sized> IntentHandler for Arc<H> {
    fn handle(&self, entities: &EntityMap) -> Result<String, BoxError> {
        (**self).handle(entities)
    }
}

impl<P: EntityProvider + ?Sized> EntityProvider for Arc<P> {
    fn alternatives(&self) -> Result<Vec<String>, BoxError> {
        (**self).alternatives()
    }
}

/// An [`IntentHandler`] backed by a closure. See [`handler_fn`].
pub struct HandlerFn<F>(F);

/// Wrap a closure as an [`IntentHandler`].
///
/// ```
/// use parlance_dialog::{handler_fn, IntentHandler, EntityMap};
///
/// let handler = handler_fn(|entities: &EntityMap| Ok(format!("{} entities", entities.len())));
/// assert_eq!(handler.handle(&EntityMap::new()).unwrap(), "0 entities");
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&EntityMap) -> Result<String, BoxError> + Send + Sync,
{
    HandlerFn(f)
}

impl<F> IntentHandler for HandlerFn<F>
where
    F: Fn(&EntityMap) -> Result<String, BoxError> + Send + Sync,
{
    fn handle(&self, entities: &EntityMap) -> Result<String, BoxError> {
        (self.0)(entities)
    }
}

/// An [`EntityProvider`] backed by a closure. See [`provider_fn`].
pub struct ProviderFn<F>(F);

/// Wrap a closure as an [`EntityProvider`].
pub fn provider_fn<F>(f: F) -> ProviderFn<F>
where
    F: Fn() -> Result<Vec<String>, BoxError> + Send + Sync,
{
    ProviderFn(f)
}

impl<F> EntityProvider for ProviderFn<F>
where
    F: Fn() -> Result<Vec<String>, BoxError> + Send + Sync,
{
    fn alternatives(&self) -> Result<Vec<String>, BoxError> {
        (self.0)()
    }
}

/// A provider with a fixed list of alternatives.
impl EntityProvider for Vec<String> {
    fn alternatives(&self) -> Result<Vec<String>, BoxError> {
        Ok(self.clone())
    }
}
