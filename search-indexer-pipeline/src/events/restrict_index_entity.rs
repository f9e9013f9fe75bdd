//! Entity restriction event.

use std::collections::BTreeSet;

use search_indexer_shared::{EntityId, IndexContext};

/// Which candidate entities may be indexed.
///
/// Starts unrestricted. `restrict_to` narrows the allowed set (repeated
/// calls intersect), `exclude` removes single entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRestriction {
    allowed: Option<BTreeSet<EntityId>>,
    excluded: BTreeSet<EntityId>,
}

impl EntityRestriction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restrict_to(&mut self, entity_ids: impl IntoIterator<Item = EntityId>) {
        let ids: BTreeSet<EntityId> = entity_ids.into_iter().collect();
        self.allowed = Some(match self.allowed.take() {
            Some(allowed) => allowed.intersection(&ids).copied().collect(),
            None => ids,
        });
    }

    pub fn exclude(&mut self, entity_ids: impl IntoIterator<Item = EntityId>) {
        self.excluded.extend(entity_ids);
    }

    pub fn is_allowed(&self, entity_id: EntityId) -> bool {
        !self.excluded.contains(&entity_id)
            && self.allowed.as_ref().map_or(true, |allowed| allowed.contains(&entity_id))
    }

    /// Candidates that pass the restriction, in their original order.
    pub fn apply(&self, candidates: &[EntityId]) -> Vec<EntityId> {
        candidates
            .iter()
            .copied()
            .filter(|entity_id| self.is_allowed(*entity_id))
            .collect()
    }
}

/// Lets listeners restrict which entities of a class get indexed.
#[derive(Debug, Clone)]
pub struct RestrictIndexEntityEvent {
    entity_class: String,
    restriction: EntityRestriction,
    context: IndexContext,
}

impl RestrictIndexEntityEvent {
    pub fn new(entity_class: impl Into<String>, context: IndexContext) -> Self {
        Self {
            entity_class: entity_class.into(),
            restriction: EntityRestriction::new(),
            context,
        }
    }

    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }

    pub fn context(&self) -> &IndexContext {
        &self.context
    }

    pub fn restriction(&self) -> &EntityRestriction {
        &self.restriction
    }

    pub fn restriction_mut(&mut self) -> &mut EntityRestriction {
        &mut self.restriction
    }

    pub fn into_restriction(self) -> EntityRestriction {
        self.restriction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_allows_all() {
        let restriction = EntityRestriction::new();
        assert_eq!(restriction.apply(&[3, 1, 2]), vec![3, 1, 2]);
    }

    #[test]
    fn test_restrict_to_intersects() {
        let mut restriction = EntityRestriction::new();
        restriction.restrict_to([1, 2, 3]);
        restriction.restrict_to([2, 3, 4]);

        assert_eq!(restriction.apply(&[1, 2, 3, 4]), vec![2, 3]);
    }

    #[test]
    fn test_exclude_wins() {
        let mut restriction = EntityRestriction::new();
        restriction.restrict_to([1, 2]);
        restriction.exclude([2]);

        assert!(restriction.is_allowed(1));
        assert!(!restriction.is_allowed(2));
        assert_eq!(restriction.apply(&[2, 1]), vec![1]);
    }
}
