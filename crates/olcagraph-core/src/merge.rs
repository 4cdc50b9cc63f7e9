//! # Archive Merger
//!
//! Unions a freshly built registry with one reconstructed from the
//! existing archive. Fresh data wins on identifier collision; nothing is
//! ever dropped. Result order per type: existing entries first (original
//! order, overridden values replaced in place), then fresh-only entries
//! appended in their build order.

use crate::registry::EntityRegistry;
use crate::types::EntityType;

/// Merge a fresh registry into an existing one.
///
/// Consumes both sides; the merged registry is the value written back to
/// the archive. Idempotent: merging the same fresh registry twice yields
/// the same result as merging it once.
#[must_use]
pub fn merge(existing: EntityRegistry, fresh: EntityRegistry) -> EntityRegistry {
    let mut merged = existing;
    for entity_type in EntityType::ALL {
        let overridden = fresh
            .all_of(entity_type)
            .filter(|e| merged.contains(entity_type, e.id()))
            .count();
        if overridden > 0 {
            tracing::debug!(
                entity_type = %entity_type,
                overridden,
                "fresh entities override existing identifiers"
            );
        }
        for entity in fresh.all_of(entity_type) {
            merged.replace(entity.clone());
        }
    }
    merged
}

// =============================================================================
// TESTS
// =============================================================================
