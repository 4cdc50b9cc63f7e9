//! # Reference Registry
//!
//! The in-memory source of truth during one build-merge-write cycle.
//!
//! One registry is owned by exactly one builder; it is passed explicitly,
//! never ambient. Entities are inserted lazily the first time a logical
//! identity is encountered and never removed. Per-type iteration preserves
//! insertion order; iteration across types follows the `EntityType`
//! ordering.

use crate::model::{Process, RootEntity};
use crate::types::EntityType;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Map from entity type to its identifier-keyed documents.
///
/// Invariant: at most one stored entity per (type, identifier) pair.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: BTreeMap<EntityType, IndexMap<String, RootEntity>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity by (type, identifier).
    #[must_use]
    pub fn get(&self, entity_type: EntityType, id: &str) -> Option<&RootEntity> {
        self.entries.get(&entity_type)?.get(id)
    }

    /// Check whether an identifier is recorded for a type.
    #[must_use]
    pub fn contains(&self, entity_type: EntityType, id: &str) -> bool {
        self.get(entity_type, id).is_some()
    }

    /// Insert an entity unless its identifier is already present.
    ///
    /// Re-insertion under an existing identifier leaves the stored instance
    /// untouched — callers that need an overwrite policy (the merger)
    /// implement it themselves. Returns whether the entity was inserted.
    pub fn upsert(&mut self, entity: RootEntity) -> bool {
        let slot = self.entries.entry(entity.entity_type()).or_default();
        if slot.contains_key(entity.id()) {
            return false;
        }
        slot.insert(entity.id().to_string(), entity);
        true
    }

    /// Insert an entity, replacing any stored instance with the same
    /// identifier in place (position preserved).
    ///
    /// Only the archive merger uses this; builds go through [`upsert`].
    ///
    /// [`upsert`]: EntityRegistry::upsert
    pub fn replace(&mut self, entity: RootEntity) {
        let slot = self.entries.entry(entity.entity_type()).or_default();
        slot.insert(entity.id().to_string(), entity);
    }

    /// All entities of a type, in insertion order.
    pub fn all_of(&self, entity_type: EntityType) -> impl Iterator<Item = &RootEntity> {
        self.entries.get(&entity_type).into_iter().flat_map(IndexMap::values)
    }

    /// All identifiers of a type, in insertion order.
    pub fn ids_of(&self, entity_type: EntityType) -> impl Iterator<Item = &str> {
        self.entries
            .get(&entity_type)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }

    /// Number of entities stored for a type.
    #[must_use]
    pub fn count(&self, entity_type: EntityType) -> usize {
        self.entries.get(&entity_type).map_or(0, IndexMap::len)
    }

    /// Total number of entities across all types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    /// Whether the registry holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Typed lookup for a stored process.
    ///
    /// The builder reuses stored processes (existing exchanges retained)
    /// when the same logical identity appears twice in one batch.
    #[must_use]
    pub fn process(&self, id: &str) -> Option<&Process> {
        match self.get(EntityType::Process, id) {
            Some(RootEntity::Process(p)) => Some(p),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Actor;

    fn actor(id: &str, name: &str) -> RootEntity {
        RootEntity::Actor(Actor {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    #[test]
    fn upsert_keeps_first_instance() {
        let mut reg = EntityRegistry::new();
        assert!(reg.upsert(actor("a1", "first")));
        assert!(!reg.upsert(actor("a1", "second")));

        let stored = reg.get(EntityType::Actor, "a1").expect("stored");
        assert_eq!(stored.name(), Some("first"));
        assert_eq!(reg.count(EntityType::Actor), 1);
    }

    #[test]
    fn replace_overwrites_in_place() {
        let mut reg = EntityRegistry::new();
        reg.upsert(actor("a1", "one"));
        reg.upsert(actor("a2", "two"));
        reg.replace(actor("a1", "one, revised"));

        let ids: Vec<_> = reg.ids_of(EntityType::Actor).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        let stored = reg.get(EntityType::Actor, "a1").expect("stored");
        assert_eq!(stored.name(), Some("one, revised"));
    }

    #[test]
    fn all_of_preserves_insertion_order() {
        let mut reg = EntityRegistry::new();
        reg.upsert(actor("z", "last alphabetically, first inserted"));
        reg.upsert(actor("a", "first alphabetically, second inserted"));

        let ids: Vec<_> = reg.ids_of(EntityType::Actor).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn empty_type_yields_nothing() {
        let reg = EntityRegistry::new();
        assert_eq!(reg.all_of(EntityType::Flow).count(), 0);
        assert!(reg.is_empty());
    }
}
