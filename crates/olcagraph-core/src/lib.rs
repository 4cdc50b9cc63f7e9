//! # olcagraph-core
//!
//! Root-entity document graphs for life cycle inventory data - THE LOGIC.
//!
//! This crate turns loosely shaped process descriptions into a typed,
//! cross-referenced graph of olca-schema root entities (processes, flows,
//! locations, actors, sources, data-quality systems, unit groups, flow
//! properties) and persists it as an archive that can be merged across
//! repeated writes.
//!
//! ## Guarantees
//!
//! - Deterministic identity: an entity without a valid supplied identifier
//!   gets one derived from its logical path, so the same input always
//!   resolves to the same entity.
//! - Tolerant building: malformed input nodes and reference-lookup misses
//!   degrade locally (skip and warn), never abort a batch.
//! - Atomic persistence: an archive write either fully replaces the
//!   previous archive or leaves it untouched.

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod catalog;
pub mod ident;
pub mod input;
pub mod merge;
pub mod model;
pub mod registry;
pub mod storage;
pub mod types;
pub mod units;
pub mod writer;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EntityType, OlcaError, RefType};

// =============================================================================
// RE-EXPORTS: Graph Building
// =============================================================================

pub use builder::{BuiltProcess, GraphBuilder};
pub use catalog::{CatalogSource, UnitCatalog, DEFAULT_BUNDLE_URL, DEFAULT_FETCH_TIMEOUT};
pub use input::ProcessSpec;
pub use merge::merge;
pub use model::{
    Actor, DqSystem, Exchange, Flow, FlowProperty, FlowPropertyFactor, FlowType, Location,
    Process, ProcessDocumentation, ProcessType, Ref, RootEntity, Source, Uncertainty,
    UncertaintyType, Unit, UnitGroup, DATA_VERSION,
};
pub use registry::EntityRegistry;

// =============================================================================
// RE-EXPORTS: Persistence
// =============================================================================

pub use storage::Archive;
pub use writer::{write_archive, WriteReport};
