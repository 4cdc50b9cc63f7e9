//! # Graph Builder
//!
//! Walks process descriptions and creates (or reuses) typed root entities
//! in an owned [`EntityRegistry`], resolving every cross-reference by
//! identifier.
//!
//! Error policy: malformed nodes are skipped with a warning, lookup
//! misses degrade to null references, invalid supplied identifiers are
//! silently regenerated. Nothing here aborts a build.
//!
//! Provider chains recurse through the same process path as top-level
//! descriptions, so a provider is a first-class registered process; the
//! recursion depth is bounded by the input's own nesting because links
//! are identifier-based, never owned sub-objects.

use crate::catalog::UnitCatalog;
use crate::ident::{self, DQ_VERSIONS, STANDARD_VERSIONS};
use crate::input::{
    DocumentationSpec, DqSystemSpec, ExchangeSpec, FlowSpec, LocationSpec, NumOrStr, ProcessSpec,
    SourceSpec, UncertaintySpec,
};
use crate::model::{
    Actor, DqSystem, Exchange, Flow, FlowPropertyFactor, FlowType, Location, Process,
    ProcessDocumentation, ProcessType, Ref, RootEntity, Source, Uncertainty, DATA_VERSION,
};
use crate::registry::EntityRegistry;
use crate::types::EntityType;
use chrono::{Datelike, NaiveDate, Utc};

/// The distribution tag accepted for exchange uncertainties. Anything
/// else yields no uncertainty.
const LOG_NORMAL_TAG: &str = "Logarithmic Normal Distribution";

/// Unit assumed when an exchange does not name one.
const DEFAULT_UNIT: &str = "kg";

/// A resolved top-level process: its reference plus the exchange flagged
/// as quantitative reference (if any), for write-back onto the caller's
/// description.
#[derive(Debug, Clone)]
pub struct BuiltProcess {
    pub process_ref: Ref,
    pub q_reference: Option<Exchange>,
}

/// Builds the document graph for one batch of process descriptions.
///
/// Owns the registry for the duration of the build; call
/// [`GraphBuilder::finish`] to take it for merging and persistence.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    catalog: &'a UnitCatalog,
    registry: EntityRegistry,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder with an empty registry.
    #[must_use]
    pub fn new(catalog: &'a UnitCatalog) -> Self {
        Self {
            catalog,
            registry: EntityRegistry::new(),
        }
    }

    /// Create a builder over a pre-populated registry (e.g. one seeded
    /// with unit groups and flow properties).
    #[must_use]
    pub fn with_registry(catalog: &'a UnitCatalog, registry: EntityRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Take the populated registry.
    #[must_use]
    pub fn finish(self) -> EntityRegistry {
        self.registry
    }

    /// Read-only view of the registry mid-build.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Resolve one process description into a registered process.
    ///
    /// If the derived identity is already registered the stored process is
    /// reused, existing exchanges retained; the quantitative reference is
    /// re-discovered from the stored exchange list.
    pub fn build_process(&mut self, spec: &ProcessSpec) -> BuiltProcess {
        let name = spec.name.clone().unwrap_or_default();
        let category = spec.category.clone().unwrap_or_default();
        let location_code = location_code(spec.location.as_ref()).unwrap_or_default();

        let uid = ident::valid_uid(spec.id.as_deref(), STANDARD_VERSIONS).unwrap_or_else(|| {
            tracing::debug!(process = %name, "deriving process identifier");
            ident::derive_uid([
                EntityType::Process.model_tag(),
                &category,
                &location_code,
                &name,
            ])
        });

        if let Some(existing) = self.registry.process(&uid) {
            tracing::debug!(process = %name, id = %uid, "reusing registered process");
            return BuiltProcess {
                process_ref: RootEntity::Process(existing.clone()).to_ref(),
                q_reference: existing.quantitative_reference().cloned(),
            };
        }

        tracing::debug!(process = %name, id = %uid, "creating process");
        let process_type = match spec.process_type.as_deref() {
            None | Some("UNIT_PROCESS") => ProcessType::UnitProcess,
            Some(other) => {
                tracing::debug!(process_type = other, "mapping process type to LCI result");
                ProcessType::LciResult
            }
        };

        let location = self.location(spec.location.as_ref());
        let documentation = self.documentation(spec.process_documentation.as_ref());
        let dq_entry = format_dq_entry(find_dq_entry(spec));
        let dq_system = self.dq_system(find_dq_system(spec, DqKind::Process), DqKind::Process);
        let exchange_dq_system =
            self.dq_system(find_dq_system(spec, DqKind::Exchange), DqKind::Exchange);
        let (exchanges, q_reference) = self.exchange_list(&spec.exchanges);

        let process = Process {
            id: uid,
            name: spec.name.clone(),
            category: spec.category.clone(),
            version: Some(
                spec.version
                    .clone()
                    .unwrap_or_else(|| DATA_VERSION.to_string()),
            ),
            description: spec.description.clone(),
            process_type,
            location,
            process_documentation: Some(documentation),
            dq_entry,
            dq_system,
            exchange_dq_system,
            exchanges,
        };
        let entity = RootEntity::Process(process);
        let process_ref = entity.to_ref();
        self.registry.upsert(entity);

        BuiltProcess {
            process_ref,
            q_reference,
        }
    }

    /// Resolve an exchange list, assigning dense 1-based sequence numbers
    /// in input order and skipping entries that fail to parse.
    ///
    /// At most one exchange is reported as quantitative reference; when
    /// the input flags more than one, the last one encountered wins.
    fn exchange_list(
        &mut self,
        entries: &[serde_json::Value],
    ) -> (Vec<Exchange>, Option<Exchange>) {
        let mut exchanges = Vec::new();
        let mut q_reference = None;
        let mut next_id = 0;

        for entry in entries {
            let spec = match ExchangeSpec::deserialize_value(entry) {
                Some(spec) => spec,
                None => {
                    tracing::warn!("malformed exchange entry skipped");
                    continue;
                }
            };
            if let Some(exchange) = self.exchange(&spec, next_id + 1) {
                next_id += 1;
                if exchange.is_quantitative_reference {
                    q_reference = Some(exchange.clone());
                }
                exchanges.push(exchange);
            }
        }
        (exchanges, q_reference)
    }

    /// Resolve one exchange. Returns `None` (logged) for an unparseable
    /// amount or a missing flow; either makes the entry unusable.
    fn exchange(&mut self, spec: &ExchangeSpec, internal_id: i32) -> Option<Exchange> {
        let amount = match &spec.amount {
            None => 0.0,
            Some(raw) => match raw.as_f64() {
                Some(v) => v,
                None => {
                    tracing::warn!("exchange with unparseable amount skipped");
                    return None;
                }
            },
        };

        let Some(flow_spec) = spec.flow.as_ref() else {
            tracing::warn!("exchange without flow data skipped");
            return None;
        };

        let unit_name = spec
            .unit
            .as_ref()
            .and_then(|u| u.name())
            .unwrap_or(DEFAULT_UNIT);
        let unit = self.catalog.unit_ref(unit_name);
        let flow_property = self.catalog.property_ref(unit_name);

        let flow = self.flow(flow_spec, flow_property.clone());
        let uncertainty = uncertainty(spec.uncertainty.as_ref());
        let default_provider = self.provider(spec.provider.as_ref());

        Some(Exchange {
            internal_id,
            is_input: spec.input,
            is_avoided_product: spec.avoided_product,
            is_quantitative_reference: spec.quantitative_reference,
            amount,
            flow,
            unit,
            flow_property,
            uncertainty,
            default_provider,
            dq_entry: format_dq_entry(spec.dq_entry.as_deref()),
            description: spec.comment.clone(),
        })
    }

    /// Resolve a provider reference by recursing into its description.
    fn provider(&mut self, value: Option<&serde_json::Value>) -> Option<Ref> {
        let value = value.filter(|v| !v.is_null())?;
        if !value.is_object() {
            tracing::debug!("provider is not a process description; ignored");
            return None;
        }
        match serde_json::from_value::<ProcessSpec>(value.clone()) {
            Ok(spec) => Some(self.build_process(&spec).process_ref),
            Err(e) => {
                tracing::warn!(error = %e, "malformed provider description ignored");
                None
            }
        }
    }

    /// Create or reuse a flow and return a reference to it.
    ///
    /// A category path containing "waste" forces the waste kind,
    /// regardless of a conflicting explicit kind in the input.
    fn flow(&mut self, spec: &FlowSpec, flow_property: Option<Ref>) -> Ref {
        let name = spec.name.clone();
        let category = spec.category.clone().unwrap_or_default();
        let is_waste = category.to_lowercase().contains("waste");

        let uid = ident::valid_uid(spec.id.as_deref(), STANDARD_VERSIONS).unwrap_or_else(|| {
            tracing::debug!(flow = name.as_deref().unwrap_or(""), "deriving flow identifier");
            ident::derive_uid([
                EntityType::Flow.model_tag(),
                &category,
                name.as_deref().unwrap_or(""),
            ])
        });

        if let Some(existing) = self.registry.get(EntityType::Flow, &uid) {
            tracing::debug!(id = %uid, "reusing registered flow");
            return existing.to_ref();
        }

        let flow_type = if is_waste {
            FlowType::WasteFlow
        } else {
            match spec.flow_type.as_deref() {
                Some("PRODUCT_FLOW") => FlowType::ProductFlow,
                Some("WASTE_FLOW") => FlowType::WasteFlow,
                _ => FlowType::ElementaryFlow,
            }
        };

        let entity = RootEntity::Flow(Flow {
            id: uid,
            name,
            category: Some(category),
            flow_type,
            flow_properties: vec![FlowPropertyFactor {
                flow_property,
                conversion_factor: 1.0,
                is_ref_flow_property: true,
            }],
        });
        let flow_ref = entity.to_ref();
        self.registry.upsert(entity);
        flow_ref
    }

    /// Create or reuse a location. No code, no location.
    ///
    /// A bare string input is treated as a code with no supplied
    /// identifier, so equal codes dedup within a build and across
    /// archive merges via the derived identifier.
    fn location(&mut self, spec: Option<&LocationSpec>) -> Option<Ref> {
        let (code, supplied_id, record) = match spec? {
            LocationSpec::Code(code) => (code.clone(), None, None),
            LocationSpec::Record(r) => (
                r.name.clone().unwrap_or_default(),
                r.id.as_deref(),
                Some(r),
            ),
        };
        if code.is_empty() {
            return None;
        }

        let uid = ident::valid_uid(supplied_id, STANDARD_VERSIONS).unwrap_or_else(|| {
            ident::derive_uid([EntityType::Location.model_tag(), &code])
        });

        if let Some(existing) = self.registry.get(EntityType::Location, &uid) {
            tracing::debug!(code = %code, "reusing registered location");
            return Some(existing.to_ref());
        }

        tracing::debug!(code = %code, "creating location");
        let entity = RootEntity::Location(Location {
            id: uid,
            name: code.clone(),
            code,
            latitude: record.and_then(|r| r.latitude),
            longitude: record.and_then(|r| r.longitude),
            description: record.and_then(|r| r.description.clone()),
        });
        let location_ref = entity.to_ref();
        self.registry.upsert(entity);
        Some(location_ref)
    }

    /// Build process documentation: flat fields copied verbatim, nested
    /// actor/source references resolved, creation timestamp stamped fresh.
    fn documentation(&mut self, spec: Option<&DocumentationSpec>) -> ProcessDocumentation {
        let mut doc = ProcessDocumentation::default();

        if let Some(spec) = spec {
            doc.time_description = spec.time_description.clone();
            doc.technology_description = spec.technology_description.clone();
            doc.data_collection_description = spec.data_collection_description.clone();
            doc.completeness_description = spec.completeness_description.clone();
            doc.data_selection_description = spec.data_selection_description.clone();
            doc.review_details = spec.review_details.clone();
            doc.data_treatment_description = spec.data_treatment_description.clone();
            doc.inventory_method_description = spec.inventory_method_description.clone();
            doc.modeling_constants_description = spec.modeling_constants_description.clone();
            doc.sampling_description = spec.sampling_description.clone();
            doc.restrictions_description = spec.restrictions_description.clone();
            doc.copyright = spec.copyright;
            doc.intended_application = spec.intended_application.clone();
            doc.project_description = spec.project_description.clone();
            doc.valid_from = format_date(spec.valid_from.as_deref());
            doc.valid_until = format_date(spec.valid_until.as_deref());

            doc.reviewer = self.actor(spec.reviewer.as_deref());
            doc.data_documentor = self.actor(spec.data_documentor.as_deref());
            doc.data_generator = self.actor(spec.data_generator.as_deref());
            doc.data_set_owner = self.actor(spec.data_set_owner.as_deref());

            doc.publication = spec.publication.as_ref().and_then(|s| self.source(s));
            doc.sources = self.source_list(&spec.sources);
        }

        doc.creation_date = Some(current_time());
        doc
    }

    /// Create or reuse an actor by name. Unnamed actors are skipped.
    fn actor(&mut self, name: Option<&str>) -> Option<Ref> {
        let name = name?.trim();
        if name.is_empty() {
            return None;
        }

        let uid = ident::derive_uid([EntityType::Actor.model_tag(), name]);
        if let Some(existing) = self.registry.get(EntityType::Actor, &uid) {
            tracing::debug!(actor = %name, "reusing registered actor");
            return Some(existing.to_ref());
        }

        tracing::debug!(actor = %name, "creating actor");
        let entity = RootEntity::Actor(Actor {
            id: uid,
            name: name.to_string(),
        });
        let actor_ref = entity.to_ref();
        self.registry.upsert(entity);
        Some(actor_ref)
    }

    /// Create or reuse a source. Sources without a name are skipped.
    fn source(&mut self, spec: &SourceSpec) -> Option<Ref> {
        let name = spec.name.as_deref().unwrap_or("");
        if name.is_empty() {
            return None;
        }
        let category = spec.category.as_ref().map(|c| c.to_path()).unwrap_or_default();

        let uid = ident::derive_uid([EntityType::Source.model_tag(), &category, name]);
        if let Some(existing) = self.registry.get(EntityType::Source, &uid) {
            tracing::debug!(source = %name, "reusing registered source");
            return Some(existing.to_ref());
        }

        tracing::debug!(source = %name, "creating source");
        let entity = RootEntity::Source(Source {
            id: uid,
            name: name.to_string(),
            category: Some(category),
            url: spec.url.clone(),
            version: Some(
                spec.version
                    .clone()
                    .unwrap_or_else(|| DATA_VERSION.to_string()),
            ),
            text_reference: Some(
                spec.text_reference
                    .clone()
                    .unwrap_or_else(|| name.to_string()),
            ),
            year: Some(check_source_year(spec.year.as_ref())),
        });
        let source_ref = entity.to_ref();
        self.registry.upsert(entity);
        Some(source_ref)
    }

    /// Resolve every source in a list, skipping unusable entries.
    fn source_list(&mut self, entries: &[serde_json::Value]) -> Vec<Ref> {
        if entries.is_empty() {
            tracing::warn!("no source data provided");
            return Vec::new();
        }
        entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<SourceSpec>(entry.clone()) {
                Ok(spec) => self.source(&spec),
                Err(e) => {
                    tracing::warn!(error = %e, "malformed source entry skipped");
                    None
                }
            })
            .collect()
    }

    /// Create or reuse a data-quality system reference.
    ///
    /// Well-known systems arrive with pre-defined v4 identifiers, which
    /// are kept; anything else gets a derived identifier.
    fn dq_system(&mut self, spec: Option<&DqSystemSpec>, kind: DqKind) -> Option<Ref> {
        let spec = spec?;
        let name = spec.name.clone().unwrap_or_else(|| "none".to_string());

        let uid = ident::valid_uid(spec.id.as_deref(), DQ_VERSIONS).unwrap_or_else(|| {
            tracing::debug!(dq_system = %name, "deriving data-quality system identifier");
            ident::derive_uid([EntityType::DqSystem.model_tag(), kind.key(), &name])
        });

        if let Some(existing) = self.registry.get(EntityType::DqSystem, &uid) {
            tracing::debug!(dq_system = %name, "reusing registered data-quality system");
            return Some(existing.to_ref());
        }

        tracing::debug!(dq_system = %name, "creating data-quality system");
        let entity = RootEntity::DqSystem(DqSystem {
            id: uid,
            name,
            description: Some(kind.description().to_string()),
        });
        let dq_ref = entity.to_ref();
        self.registry.upsert(entity);
        Some(dq_ref)
    }
}

// =============================================================================
// DATA-QUALITY LOOKUP
// =============================================================================

/// Which of the two data-quality system slots is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DqKind {
    Process,
    Exchange,
}

impl DqKind {
    const fn key(self) -> &'static str {
        match self {
            DqKind::Process => "dqSystem",
            DqKind::Exchange => "exchangeDqSystem",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            DqKind::Process => "A process data quality system entry.",
            DqKind::Exchange => "An exchange data quality system entry.",
        }
    }
}

/// Data-quality entry: process record first, documentation fallback.
fn find_dq_entry(spec: &ProcessSpec) -> Option<&str> {
    spec.dq_entry
        .as_deref()
        .or_else(|| spec.process_documentation.as_ref()?.dq_entry.as_deref())
}

/// Data-quality system: process record first, documentation fallback.
fn find_dq_system(spec: &ProcessSpec, kind: DqKind) -> Option<&DqSystemSpec> {
    let (direct, nested) = match kind {
        DqKind::Process => (
            spec.dq_system.as_ref(),
            spec.process_documentation.as_ref().and_then(|d| d.dq_system.as_ref()),
        ),
        DqKind::Exchange => (
            spec.exchange_dq_system.as_ref(),
            spec.process_documentation
                .as_ref()
                .and_then(|d| d.exchange_dq_system.as_ref()),
        ),
    };
    direct.or(nested)
}

// =============================================================================
// VALUE HELPERS
// =============================================================================

impl ExchangeSpec {
    /// Parse one exchange entry, `None` for non-object or otherwise
    /// unusable values.
    fn deserialize_value(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Resolve an uncertainty record into a log-normal distribution.
///
/// Any other distribution tag, or an unparseable/missing geometric mean
/// or standard deviation, yields no uncertainty rather than a default.
fn uncertainty(spec: Option<&UncertaintySpec>) -> Option<Uncertainty> {
    let spec = spec?;
    let tag = spec.distribution_type.as_deref();
    if tag != Some(LOG_NORMAL_TAG) {
        tracing::debug!(distribution = tag.unwrap_or(""), "unsupported uncertainty distribution");
        return None;
    }

    let geom_mean = spec.geom_mean.as_ref().and_then(NumOrStr::as_f64);
    let geom_sd = spec.geom_sd.as_ref().and_then(NumOrStr::as_f64);
    match (geom_mean, geom_sd) {
        (Some(mean), Some(sd)) => Some(Uncertainty::log_normal(mean, sd)),
        _ => {
            tracing::debug!("invalid geometric mean or standard deviation");
            None
        }
    }
}

/// The location code carried by a location input, structured or bare.
fn location_code(spec: Option<&LocationSpec>) -> Option<String> {
    match spec? {
        LocationSpec::Code(code) => Some(code.clone()),
        LocationSpec::Record(r) => r.name.clone(),
    }
}

/// Normalize a data-quality entry string like `(1.0;2.4;n.a.;5)` to
/// integer scores: `(1;2;n.a.;5)`. `n.a.` and `nan` tokens pass through.
fn format_dq_entry(entry: Option<&str>) -> Option<String> {
    let entry = entry?.trim();
    if entry.len() < 2 {
        return None;
    }
    let inner = entry.trim_start_matches('(').trim_end_matches(')');
    let scores: Vec<String> = inner
        .split(';')
        .map(|token| {
            let token = token.trim();
            if token == "n.a." || token == "nan" {
                token.to_string()
            } else {
                token
                    .parse::<f64>()
                    .map(|v| format!("{}", v.round() as i64))
                    .unwrap_or_else(|_| token.to_string())
            }
        })
        .collect();
    Some(format!("({})", scores.join(";")))
}

/// Convert a `M/D/YYYY` date string to ISO format. Anything else is a
/// logged warning and `None`.
fn format_date(entry: Option<&str>) -> Option<String> {
    let entry = entry?;
    match NaiveDate::parse_from_str(entry, "%m/%d/%Y") {
        Ok(date) => Some(format!("{}T00:00:00", date.format("%Y-%m-%d"))),
        Err(_) => {
            tracing::warn!(date = entry, "unexpected date format (expected M/D/YYYY)");
            None
        }
    }
}

/// Validate a source year: integer within `0..=current_year + 1`, else
/// the current year.
fn check_source_year(year: Option<&NumOrStr>) -> i32 {
    let current = current_year();
    match year.and_then(NumOrStr::as_f64) {
        Some(value) => {
            let year = value.trunc() as i32;
            if (0..=current + 1).contains(&year) {
                year
            } else {
                tracing::warn!(year, "source year out of range, defaulting to current year");
                current
            }
        }
        None => {
            tracing::warn!("invalid source year, defaulting to current year");
            current
        }
    }
}

/// ISO-formatted timestamp for right now (UTC).
fn current_time() -> String {
    Utc::now().to_rfc3339()
}

/// Today's calendar year (UTC).
fn current_year() -> i32 {
    Utc::now().year()
}

// =============================================================================
// TESTS
// =============================================================================
