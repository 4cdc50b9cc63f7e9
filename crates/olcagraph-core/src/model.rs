//! # Root Entity Model
//!
//! Typed olca-schema root entities and their value objects.
//!
//! Every root entity carries a stable identifier (`@id`), a display name,
//! and an optional forward-slash-separated category path. Serialized
//! documents are olca-schema-shaped JSON: `@type`/`@id` tags, camelCase
//! keys, nulls omitted.
//!
//! Cross-references between entities are [`Ref`] values (identifier plus
//! denormalized display data), never nested owned objects, so provider
//! chains cannot form ownership cycles.

use crate::types::{EntityType, RefType};
use serde::{Deserialize, Serialize};

/// Version stamped onto entities created without an explicit version.
pub const DATA_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// REFERENCES
// =============================================================================

/// A weak, non-owning pointer to a root entity.
///
/// Carries the identifier plus enough denormalized data (name, category)
/// to display without dereferencing the target document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "@type")]
    pub ref_type: RefType,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ref {
    /// Create a reference with name but no category.
    #[must_use]
    pub fn new(ref_type: RefType, id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            ref_type,
            id: id.into(),
            name,
            category: None,
        }
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// The kind of a flow.
///
/// Elementary unless the category path indicates waste; a waste category
/// forces `WasteFlow` regardless of a conflicting explicit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowType {
    #[serde(rename = "ELEMENTARY_FLOW")]
    ElementaryFlow,
    #[serde(rename = "PRODUCT_FLOW")]
    ProductFlow,
    #[serde(rename = "WASTE_FLOW")]
    WasteFlow,
}

/// The kind of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessType {
    #[serde(rename = "UNIT_PROCESS")]
    UnitProcess,
    #[serde(rename = "LCI_RESULT")]
    LciResult,
}

/// Supported uncertainty distribution types.
///
/// Only log-normal distributions are ever constructed by the builder; the
/// remaining variants exist so previously written archives deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UncertaintyType {
    #[serde(rename = "LOG_NORMAL_DISTRIBUTION")]
    LogNormal,
    #[serde(rename = "NORMAL_DISTRIBUTION")]
    Normal,
    #[serde(rename = "TRIANGLE_DISTRIBUTION")]
    Triangle,
    #[serde(rename = "UNIFORM_DISTRIBUTION")]
    Uniform,
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// An uncertainty distribution attached to an exchange.
///
/// The builder only produces log-normal distributions with geometric mean
/// and geometric standard deviation; absent or invalid inputs yield no
/// uncertainty rather than a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uncertainty {
    pub distribution_type: UncertaintyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geom_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geom_sd: Option<f64>,
}

impl Uncertainty {
    /// Create a log-normal uncertainty.
    #[must_use]
    pub fn log_normal(geom_mean: f64, geom_sd: f64) -> Self {
        Self {
            distribution_type: UncertaintyType::LogNormal,
            geom_mean: Some(geom_mean),
            geom_sd: Some(geom_sd),
        }
    }
}

/// A single exchange owned by exactly one process.
///
/// `internal_id` is 1-based and unique within the owning process's
/// exchange list; it disambiguates repeated flows so they can be linked to
/// different providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub internal_id: i32,
    pub is_input: bool,
    pub is_avoided_product: bool,
    pub is_quantitative_reference: bool,
    pub amount: f64,
    /// Reference to the exchanged flow.
    pub flow: Ref,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<Uncertainty>,
    /// Provider process for product inputs, resolved by identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Links a flow to one of its quantities with a conversion factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPropertyFactor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,
    pub conversion_factor: f64,
    pub is_ref_flow_property: bool,
}

/// A measurement unit inside a unit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub conversion_factor: f64,
    pub is_ref_unit: bool,
}

/// Descriptive metadata for a process.
///
/// Flat text fields are copied verbatim from the input; actor and source
/// fields are resolved references; `creation_date` is always stamped fresh
/// at build time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessDocumentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_collection_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completeness_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_selection_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_treatment_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_method_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modeling_constants_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_documentor: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_generator: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_set_owner: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<Ref>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

// =============================================================================
// ROOT ENTITIES
// =============================================================================

/// A named activity owning an ordered exchange list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub process_type: ProcessType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_documentation: Option<ProcessDocumentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq_system: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_dq_system: Option<Ref>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exchanges: Vec<Exchange>,
}

impl Process {
    /// The exchange flagged as quantitative reference, if any.
    ///
    /// At most one exchange carries the flag; when input data marked more
    /// than one, the last in list order was kept as the reference.
    #[must_use]
    pub fn quantitative_reference(&self) -> Option<&Exchange> {
        self.exchanges
            .iter()
            .rfind(|e| e.is_quantitative_reference)
    }
}

/// A substance, product, or waste moved by exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub flow_type: FlowType,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub flow_properties: Vec<FlowPropertyFactor>,
}

/// A coded place, e.g. a balancing-authority or region acronym.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named party (reviewer, data generator, data set owner, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
}

/// A cited document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// A scheme for reporting per-process or per-exchange data-quality vectors.
///
/// Referenced far more often than created; well-known systems arrive with
/// pre-defined v4 identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DqSystem {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A group of convertible measurement units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitGroup {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub units: Vec<Unit>,
}

/// A quantity kind (mass, energy, ...) measured by a unit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProperty {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_group: Option<Ref>,
}

// =============================================================================
// ROOT ENTITY WRAPPER
// =============================================================================

/// Any persisted root entity, tagged by its olca `@type`.
///
/// This is the document type stored in the archive and held by the
/// registry; the tag keeps serialized documents self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum RootEntity {
    Actor(Actor),
    #[serde(rename = "DQSystem")]
    DqSystem(DqSystem),
    Flow(Flow),
    FlowProperty(FlowProperty),
    Location(Location),
    Process(Process),
    Source(Source),
    UnitGroup(UnitGroup),
}

impl RootEntity {
    /// The entity type tag.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        match self {
            RootEntity::Actor(_) => EntityType::Actor,
            RootEntity::DqSystem(_) => EntityType::DqSystem,
            RootEntity::Flow(_) => EntityType::Flow,
            RootEntity::FlowProperty(_) => EntityType::FlowProperty,
            RootEntity::Location(_) => EntityType::Location,
            RootEntity::Process(_) => EntityType::Process,
            RootEntity::Source(_) => EntityType::Source,
            RootEntity::UnitGroup(_) => EntityType::UnitGroup,
        }
    }

    /// The stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            RootEntity::Actor(e) => &e.id,
            RootEntity::DqSystem(e) => &e.id,
            RootEntity::Flow(e) => &e.id,
            RootEntity::FlowProperty(e) => &e.id,
            RootEntity::Location(e) => &e.id,
            RootEntity::Process(e) => &e.id,
            RootEntity::Source(e) => &e.id,
            RootEntity::UnitGroup(e) => &e.id,
        }
    }

    /// The display name, if the entity has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            RootEntity::Actor(e) => Some(&e.name),
            RootEntity::DqSystem(e) => Some(&e.name),
            RootEntity::Flow(e) => e.name.as_deref(),
            RootEntity::FlowProperty(e) => Some(&e.name),
            RootEntity::Location(e) => Some(&e.name),
            RootEntity::Process(e) => e.name.as_deref(),
            RootEntity::Source(e) => Some(&e.name),
            RootEntity::UnitGroup(e) => Some(&e.name),
        }
    }

    /// The category path, if the entity has one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            RootEntity::Flow(e) => e.category.as_deref(),
            RootEntity::FlowProperty(e) => e.category.as_deref(),
            RootEntity::Process(e) => e.category.as_deref(),
            RootEntity::Source(e) => e.category.as_deref(),
            RootEntity::UnitGroup(e) => e.category.as_deref(),
            _ => None,
        }
    }

    /// A weak reference to this entity.
    #[must_use]
    pub fn to_ref(&self) -> Ref {
        Ref {
            ref_type: self.entity_type().into(),
            id: self.id().to_string(),
            name: self.name().map(str::to_string),
            category: self.category().map(str::to_string),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
