//! # Unit/Quantity Catalog
//!
//! Resolves every exchange's unit and quantity (flow property) reference.
//!
//! Two layers back the catalog:
//! - the static reference table in [`crate::units`], which answers all
//!   `unit_ref`/`property_ref` lookups and works offline;
//! - a reference-data bundle of full `UnitGroup` and `FlowProperty`
//!   documents used to seed brand-new archives, loaded once per catalog:
//!   local JSON cache files if present, else a timeout-bounded remote
//!   fetch that persists the cache, else documents synthesized from the
//!   static table.
//!
//! Lookup misses are data-quality warnings, never fatal: a missing
//! quantity degrades a single exchange's completeness, not the build.

use crate::model::{FlowProperty, Ref, Unit, UnitGroup};
use crate::types::{OlcaError, RefType};
use crate::units::{self, UNIT_TABLE};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Cache file for unit group documents.
const UNIT_GROUP_CACHE: &str = "unit_groups.json";

/// Cache file for flow property documents.
const FLOW_PROPERTY_CACHE: &str = "flow_properties.json";

/// Default bound on the catalog bundle fetch. A slow or unreachable host
/// degrades lookups, it never hangs the build.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default location of the reference-data bundle.
pub const DEFAULT_BUNDLE_URL: &str =
    "https://www.lcacommons.gov/lca-collaboration/ws/public/download/json/repository_Federal_LCA_Commons@elementary_flow_list";

// =============================================================================
// REMOTE SOURCE
// =============================================================================

/// Where to fetch the reference-data bundle from when no cache exists.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    /// Base URL; `/unit_groups.json` and `/flow_properties.json` are
    /// appended.
    pub base_url: String,
    /// Request timeout for each document.
    pub timeout: Duration,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BUNDLE_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl CatalogSource {
    fn fetch(&self) -> Result<(Vec<UnitGroup>, Vec<FlowProperty>), OlcaError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| OlcaError::Catalog(e.to_string()))?;

        let groups: Vec<UnitGroup> = client
            .get(format!("{}/unit_groups.json", self.base_url))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|r| r.json())
            .map_err(|e| OlcaError::Catalog(format!("unit group fetch failed: {e}")))?;

        let properties: Vec<FlowProperty> = client
            .get(format!("{}/flow_properties.json", self.base_url))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|r| r.json())
            .map_err(|e| OlcaError::Catalog(format!("flow property fetch failed: {e}")))?;

        Ok((groups, properties))
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// The loaded unit/quantity catalog.
///
/// Loaded once per process lifetime and shared (immutably) by every
/// builder; all lookups are read-only.
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    unit_groups: Vec<UnitGroup>,
    flow_properties: Vec<FlowProperty>,
}

impl UnitCatalog {
    /// Build the catalog purely from the static reference table.
    ///
    /// Always available; used directly in tests and as the degraded mode
    /// when neither cache nor remote bundle can be loaded.
    #[must_use]
    pub fn bundled() -> Self {
        let mut unit_groups: Vec<UnitGroup> = Vec::new();
        let mut flow_properties: Vec<FlowProperty> = Vec::new();

        for entry in UNIT_TABLE {
            if !unit_groups.iter().any(|g| g.id == entry.group_id) {
                unit_groups.push(UnitGroup {
                    id: entry.group_id.to_string(),
                    name: entry.group.to_string(),
                    category: Some("Technical unit groups".to_string()),
                    units: Vec::new(),
                });
                flow_properties.push(FlowProperty {
                    id: entry.property_id.to_string(),
                    name: entry.property.to_string(),
                    category: Some("Technical flow properties".to_string()),
                    unit_group: Some(Ref::new(
                        RefType::UnitGroup,
                        entry.group_id,
                        Some(entry.group.to_string()),
                    )),
                });
            }
            if let Some(group) = unit_groups.iter_mut().find(|g| g.id == entry.group_id) {
                group.units.push(Unit {
                    id: entry.unit_id.to_string(),
                    name: entry.name.to_string(),
                    conversion_factor: entry.conversion_factor,
                    is_ref_unit: entry.is_ref_unit,
                });
            }
        }

        Self {
            unit_groups,
            flow_properties,
        }
    }

    /// Load the catalog for a data directory.
    ///
    /// Cache files are used when both are present; otherwise the remote
    /// bundle is fetched and the cache persisted. Any failure along the
    /// way logs a warning and falls back to [`UnitCatalog::bundled`] —
    /// loading never fails the caller.
    #[must_use]
    pub fn load(data_dir: &Path, source: Option<&CatalogSource>) -> Self {
        match Self::try_load(data_dir, source) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "catalog bundle unavailable, using built-in reference table");
                Self::bundled()
            }
        }
    }

    fn try_load(data_dir: &Path, source: Option<&CatalogSource>) -> Result<Self, OlcaError> {
        let group_path = data_dir.join(UNIT_GROUP_CACHE);
        let property_path = data_dir.join(FLOW_PROPERTY_CACHE);

        if group_path.is_file() && property_path.is_file() {
            tracing::info!(path = %data_dir.display(), "reading catalog bundle from local cache");
            return Ok(Self {
                unit_groups: read_cache(&group_path)?,
                flow_properties: read_cache(&property_path)?,
            });
        }

        let Some(source) = source else {
            return Err(OlcaError::Catalog(
                "no local cache and no remote source configured".to_string(),
            ));
        };

        tracing::info!(url = %source.base_url, "fetching catalog bundle");
        let (unit_groups, flow_properties) = source.fetch()?;

        // Persist so the fetch happens at most once per data directory.
        write_cache(&group_path, &unit_groups)?;
        write_cache(&property_path, &flow_properties)?;
        tracing::info!(
            unit_groups = unit_groups.len(),
            flow_properties = flow_properties.len(),
            "catalog bundle cached"
        );

        Ok(Self {
            unit_groups,
            flow_properties,
        })
    }

    /// Reference to the measurement unit with the given name.
    #[must_use]
    pub fn unit_ref(&self, name: &str) -> Option<Ref> {
        match units::entry(name) {
            Some(entry) => Some(Ref::new(
                RefType::Unit,
                entry.unit_id,
                Some(entry.name.to_string()),
            )),
            None => {
                tracing::warn!(unit = name, "unknown unit; no unit reference");
                None
            }
        }
    }

    /// Reference to the flow property (quantity kind) measured by the
    /// given unit.
    #[must_use]
    pub fn property_ref(&self, unit_name: &str) -> Option<Ref> {
        match units::entry(unit_name) {
            Some(entry) => Some(Ref::new(
                RefType::FlowProperty,
                entry.property_id,
                Some(entry.property.to_string()),
            )),
            None => {
                tracing::warn!(unit = unit_name, "unknown unit; no flow property reference");
                None
            }
        }
    }

    /// The unit group documents for archive seeding.
    #[must_use]
    pub fn unit_groups(&self) -> &[UnitGroup] {
        &self.unit_groups
    }

    /// The flow property documents for archive seeding.
    #[must_use]
    pub fn flow_properties(&self) -> &[FlowProperty] {
        &self.flow_properties
    }
}

fn read_cache<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, OlcaError> {
    let bytes = fs::read(path).map_err(|e| OlcaError::Io(e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| OlcaError::Catalog(format!("cache {} unreadable: {e}", path.display())))
}

fn write_cache<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<(), OlcaError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| OlcaError::Io(e.to_string()))?;
    }
    let bytes = serde_json::to_vec(items).map_err(|e| OlcaError::Serialization(e.to_string()))?;
    fs::write(path, bytes).map_err(|e| OlcaError::Io(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
