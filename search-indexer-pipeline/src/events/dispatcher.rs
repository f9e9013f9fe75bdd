//! Event dispatcher and listener registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::{
    scoped, CollectContextEvent, IndexEntityEvent, RestrictIndexEntityEvent, SearchEvent,
    COLLECT_CONTEXT, INDEX_ENTITY, RESTRICT_INDEX_ENTITY,
};
use crate::errors::PipelineError;

/// A field or context collector.
pub trait SearchEventListener: Send + Sync {
    fn handle(&self, event: &mut SearchEvent<'_>) -> Result<(), PipelineError>;
}

/// Delivers named events to listeners.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event_name: &str, event: &mut SearchEvent<'_>) -> Result<(), PipelineError>;
}

/// Listeners keyed by event name, called in registration order.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: HashMap<String, Vec<Arc<dyn SearchEventListener>>>,
}

struct CollectContextListener<F>(F);

impl<F> SearchEventListener for CollectContextListener<F>
where
    F: Fn(&mut CollectContextEvent) -> Result<(), PipelineError> + Send + Sync,
{
    fn handle(&self, event: &mut SearchEvent<'_>) -> Result<(), PipelineError> {
        match event {
            SearchEvent::CollectContext(event) => (self.0)(&mut **event),
            _ => Ok(()),
        }
    }
}

struct IndexEntityListener<F>(F);

impl<F> SearchEventListener for IndexEntityListener<F>
where
    F: Fn(&mut IndexEntityEvent) -> Result<(), PipelineError> + Send + Sync,
{
    fn handle(&self, event: &mut SearchEvent<'_>) -> Result<(), PipelineError> {
        match event {
            SearchEvent::IndexEntity(event) => (self.0)(&mut **event),
            _ => Ok(()),
        }
    }
}

struct RestrictIndexEntityListener<F>(F);

impl<F> SearchEventListener for RestrictIndexEntityListener<F>
where
    F: Fn(&mut RestrictIndexEntityEvent) -> Result<(), PipelineError> + Send + Sync,
{
    fn handle(&self, event: &mut SearchEvent<'_>) -> Result<(), PipelineError> {
        match event {
            SearchEvent::RestrictIndexEntity(event) => (self.0)(&mut **event),
            _ => Ok(()),
        }
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        event_name: impl Into<String>,
        listener: Arc<dyn SearchEventListener>,
    ) -> &mut Self {
        self.listeners.entry(event_name.into()).or_default().push(listener);
        self
    }

    pub fn on_collect_context<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut CollectContextEvent) -> Result<(), PipelineError> + Send + Sync + 'static,
    {
        self.add_listener(COLLECT_CONTEXT, Arc::new(CollectContextListener(listener)))
    }

    /// Listen for field collection of every entity class.
    pub fn on_index_entity<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut IndexEntityEvent) -> Result<(), PipelineError> + Send + Sync + 'static,
    {
        self.add_listener(INDEX_ENTITY, Arc::new(IndexEntityListener(listener)))
    }

    /// Listen for field collection of the entity class with `alias`.
    pub fn on_index_entity_for<F>(&mut self, alias: &str, listener: F) -> &mut Self
    where
        F: Fn(&mut IndexEntityEvent) -> Result<(), PipelineError> + Send + Sync + 'static,
    {
        self.add_listener(scoped(INDEX_ENTITY, alias), Arc::new(IndexEntityListener(listener)))
    }

    pub fn on_restrict_index_entity<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut RestrictIndexEntityEvent) -> Result<(), PipelineError> + Send + Sync + 'static,
    {
        self.add_listener(RESTRICT_INDEX_ENTITY, Arc::new(RestrictIndexEntityListener(listener)))
    }

    pub fn on_restrict_index_entity_for<F>(&mut self, alias: &str, listener: F) -> &mut Self
    where
        F: Fn(&mut RestrictIndexEntityEvent) -> Result<(), PipelineError> + Send + Sync + 'static,
    {
        self.add_listener(
            scoped(RESTRICT_INDEX_ENTITY, alias),
            Arc::new(RestrictIndexEntityListener(listener)),
        )
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners.get(event_name).map_or(0, Vec::len)
    }
}

impl EventDispatcher for ListenerRegistry {
    #[instrument(skip(self, event))]
    fn dispatch(&self, event_name: &str, event: &mut SearchEvent<'_>) -> Result<(), PipelineError> {
        let Some(listeners) = self.listeners.get(event_name) else {
            return Ok(());
        };

        debug!(listeners = listeners.len(), "Dispatching event");
        for listener in listeners {
            listener.handle(event)?;
        }
        Ok(())
    }
}
