//! Indexing events and their dispatch.
//!
//! Field collectors are listeners: they receive an event, mutate the data it
//! carries and return. Entity-level events are dispatched twice, first under
//! the generic name and then under the name scoped to the entity alias.

mod collect_context;
mod dispatcher;
mod index_entity;
mod restrict_index_entity;

pub use collect_context::CollectContextEvent;
pub use dispatcher::{EventDispatcher, ListenerRegistry, SearchEventListener};
pub use index_entity::IndexEntityEvent;
pub use restrict_index_entity::{EntityRestriction, RestrictIndexEntityEvent};

/// Dispatched once per website before its entities are indexed.
pub const COLLECT_CONTEXT: &str = "website_search.collect_context";

/// Dispatched to collect field values of a batch of entities.
pub const INDEX_ENTITY: &str = "website_search.index_entity";

/// Dispatched to narrow the set of entities that may be indexed.
pub const RESTRICT_INDEX_ENTITY: &str = "website_search.restrict_index_entity";

/// Event name scoped to one entity alias, e.g. `website_search.index_entity.product`.
pub fn scoped(event_name: &str, alias: &str) -> String {
    format!("{}.{}", event_name, alias)
}

/// An event on its way through the dispatcher.
#[derive(Debug)]
pub enum SearchEvent<'a> {
    CollectContext(&'a mut CollectContextEvent),
    IndexEntity(&'a mut IndexEntityEvent),
    RestrictIndexEntity(&'a mut RestrictIndexEntityEvent),
}
