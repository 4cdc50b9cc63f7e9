//! # Core Type Definitions
//!
//! Shared types for the olcagraph document graph:
//! - Root entity type tags (`EntityType`)
//! - Error types (`OlcaError`)
//!
//! ## Determinism Guarantees
//!
//! `EntityType` implements `Ord` so that per-type iteration over a
//! `BTreeMap<EntityType, _>` registry is stable across runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ROOT ENTITY TYPES
// =============================================================================

/// The root entity types tracked by the archive.
///
/// Each variant corresponds to one persisted document type; the serialized
/// form matches the olca-schema `@type` tag (e.g. `"DQSystem"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Actor,
    #[serde(rename = "DQSystem")]
    DqSystem,
    Flow,
    FlowProperty,
    Location,
    Process,
    Source,
    UnitGroup,
}

impl EntityType {
    /// All root entity types, in deterministic order.
    pub const ALL: [EntityType; 8] = [
        EntityType::Actor,
        EntityType::DqSystem,
        EntityType::Flow,
        EntityType::FlowProperty,
        EntityType::Location,
        EntityType::Process,
        EntityType::Source,
        EntityType::UnitGroup,
    ];

    /// The olca-schema `@type` tag for this entity type.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            EntityType::Actor => "Actor",
            EntityType::DqSystem => "DQSystem",
            EntityType::Flow => "Flow",
            EntityType::FlowProperty => "FlowProperty",
            EntityType::Location => "Location",
            EntityType::Process => "Process",
            EntityType::Source => "Source",
            EntityType::UnitGroup => "UnitGroup",
        }
    }

    /// The archive table name for this entity type.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            EntityType::Actor => "actors",
            EntityType::DqSystem => "dq_systems",
            EntityType::Flow => "flows",
            EntityType::FlowProperty => "flow_properties",
            EntityType::Location => "locations",
            EntityType::Process => "processes",
            EntityType::Source => "sources",
            EntityType::UnitGroup => "unit_groups",
        }
    }

    /// The model-type segment used as the first element of a derived
    /// identifier path (e.g. `modeltype.process/...`).
    #[must_use]
    pub const fn model_tag(self) -> &'static str {
        match self {
            EntityType::Actor => "modeltype.actor",
            EntityType::DqSystem => "modeltype.dq_system",
            EntityType::Flow => "modeltype.flow",
            EntityType::FlowProperty => "modeltype.flow_property",
            EntityType::Location => "modeltype.location",
            EntityType::Process => "modeltype.process",
            EntityType::Source => "modeltype.source",
            EntityType::UnitGroup => "modeltype.unit_group",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// =============================================================================
// REFERENCE TARGET TYPES
// =============================================================================

/// The `@type` tag carried by a reference.
///
/// A superset of [`EntityType`]: units live inside unit-group documents
/// rather than in their own table, but exchanges still point at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefType {
    Actor,
    #[serde(rename = "DQSystem")]
    DqSystem,
    Flow,
    FlowProperty,
    Location,
    Process,
    Source,
    Unit,
    UnitGroup,
}

impl From<EntityType> for RefType {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Actor => RefType::Actor,
            EntityType::DqSystem => RefType::DqSystem,
            EntityType::Flow => RefType::Flow,
            EntityType::FlowProperty => RefType::FlowProperty,
            EntityType::Location => RefType::Location,
            EntityType::Process => RefType::Process,
            EntityType::Source => RefType::Source,
            EntityType::UnitGroup => RefType::UnitGroup,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building, merging, or persisting a graph.
///
/// Only archive-level failures are fatal for an operation; malformed input
/// nodes and reference-resolution misses are logged and skipped by the
/// builder instead of surfacing here.
#[derive(Debug, Error)]
pub enum OlcaError {
    /// The archive path does not exist. Callers treat this as "start from
    /// an empty registry", not as a failure.
    #[error("Archive not found: {0}")]
    ArchiveNotFound(String),

    /// The archive exists but cannot be read. Fatal for the operation; the
    /// on-disk file is left untouched.
    #[error("Archive corrupt: {0}")]
    ArchiveCorrupt(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The unit/quantity catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A name did not match any known root entity type.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// The requested document was not found in the archive.
    #[error("No {0} with identifier '{1}'")]
    EntityNotFound(String, String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_ordering_is_stable() {
        let mut shuffled = vec![EntityType::Process, EntityType::Actor, EntityType::Flow];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![EntityType::Actor, EntityType::Flow, EntityType::Process]
        );
    }

    #[test]
    fn entity_type_serializes_as_olca_tag() {
        let json = serde_json::to_string(&EntityType::DqSystem).expect("serialize");
        assert_eq!(json, "\"DQSystem\"");
        let json = serde_json::to_string(&EntityType::FlowProperty).expect("serialize");
        assert_eq!(json, "\"FlowProperty\"");
    }

    #[test]
    fn table_names_are_unique() {
        let mut names: Vec<_> = EntityType::ALL.iter().map(|t| t.table_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EntityType::ALL.len());
    }
}
