//! # Write Cycle
//!
//! The top-level build-merge-write operation: turn a batch of process
//! descriptions into root entities, union them with whatever the archive
//! already holds, and atomically replace the archive.
//!
//! The caller's description map is annotated in place with the resolved
//! identity of each process and its quantitative reference, so upstream
//! pipelines can link batches without re-reading the archive.

use crate::builder::GraphBuilder;
use crate::catalog::UnitCatalog;
use crate::input::ProcessSpec;
use crate::merge::merge;
use crate::model::RootEntity;
use crate::registry::EntityRegistry;
use crate::storage::Archive;
use crate::types::OlcaError;
use std::fs;
use std::path::Path;

/// Outcome of one write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Process descriptions successfully built.
    pub processes_built: usize,
    /// Process descriptions skipped as malformed.
    pub descriptions_skipped: usize,
    /// Total entities in the archive after the merge.
    pub entities_written: usize,
    /// Whether reference data was seeded (first write to this path).
    pub seeded: bool,
}

/// Build, merge, and persist one batch of process descriptions.
///
/// A brand-new archive is seeded with the catalog's unit group and flow
/// property documents before the batch is built. An existing archive is
/// read back in full and merged, fresh data winning on collision.
///
/// Each description in the map gains a `uuid` key; descriptions whose
/// process has a quantitative reference also gain `q_reference_name`,
/// `q_reference_id`, `q_reference_cat`, and `q_reference_unit`.
///
/// # Errors
///
/// Fails only on archive-level problems: an unreadable existing archive
/// or an I/O failure during the atomic replace. Malformed descriptions
/// are skipped and counted, never fatal.
pub fn write_archive(
    descriptions: &mut serde_json::Map<String, serde_json::Value>,
    catalog: &UnitCatalog,
    path: &Path,
) -> Result<WriteReport, OlcaError> {
    let archive = Archive::at(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| OlcaError::Io(e.to_string()))?;
    }

    let seeded = !archive.exists();
    let existing = if seeded {
        tracing::info!(path = %path.display(), "creating new archive");
        EntityRegistry::new()
    } else {
        archive.read_registry()?
    };

    let mut registry = EntityRegistry::new();
    if seeded {
        for group in catalog.unit_groups() {
            registry.upsert(RootEntity::UnitGroup(group.clone()));
        }
        for property in catalog.flow_properties() {
            registry.upsert(RootEntity::FlowProperty(property.clone()));
        }
        tracing::debug!(entities = registry.total(), "reference data seeded");
    }

    let mut builder = GraphBuilder::with_registry(catalog, registry);
    let mut processes_built = 0;
    let mut descriptions_skipped = 0;

    for (key, value) in descriptions.iter_mut() {
        let spec = match serde_json::from_value::<ProcessSpec>(value.clone()) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(description = %key, error = %e, "malformed process description skipped");
                descriptions_skipped += 1;
                continue;
            }
        };

        let built = builder.build_process(&spec);
        processes_built += 1;

        let Some(entry) = value.as_object_mut() else {
            // Non-object values cannot parse as descriptions, so this arm
            // is unreachable in practice; the annotation is simply dropped.
            continue;
        };
        entry.insert("uuid".to_string(), built.process_ref.id.clone().into());
        if let Some(q_ref) = &built.q_reference {
            entry.insert(
                "q_reference_name".to_string(),
                q_ref.flow.name.clone().into(),
            );
            entry.insert("q_reference_id".to_string(), q_ref.flow.id.clone().into());
            entry.insert(
                "q_reference_cat".to_string(),
                q_ref.flow.category.clone().into(),
            );
            entry.insert(
                "q_reference_unit".to_string(),
                q_ref.unit.as_ref().and_then(|u| u.name.clone()).into(),
            );
        }
    }

    let merged = merge(existing, builder.finish());
    let entities_written = merged.total();
    archive.write(&merged)?;

    tracing::info!(
        processes = processes_built,
        skipped = descriptions_skipped,
        entities = entities_written,
        "write cycle complete"
    );
    Ok(WriteReport {
        processes_built,
        descriptions_skipped,
        entities_written,
        seeded,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityType;
    use serde_json::json;
    use tempfile::tempdir;

    fn descriptions(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }

    fn generation_batch() -> serde_json::Map<String, serde_json::Value> {
        descriptions(json!({
            "gen": {
                "name": "electricity generation",
                "category": "22: Utilities",
                "location": "RFCW",
                "exchanges": [
                    {"input": true, "amount": 2.5, "unit": "MJ",
                     "flow": {"name": "fuel", "category": "21: Mining"}},
                    {"quantitativeReference": true, "amount": 1, "unit": "MWh",
                     "flow": {"name": "electricity", "category": "22: Utilities"}}
                ]
            }
        }))
    }

    #[test]
    fn first_write_seeds_and_annotates() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut batch = generation_batch();
        let report = write_archive(&mut batch, &catalog, &path).expect("write");

        assert!(report.seeded);
        assert_eq!(report.processes_built, 1);
        assert_eq!(report.descriptions_skipped, 0);

        let entry = batch["gen"].as_object().expect("annotated entry");
        assert!(entry.contains_key("uuid"));
        assert_eq!(entry["q_reference_name"], "electricity");
        assert_eq!(entry["q_reference_unit"], "MWh");
        assert_eq!(entry["q_reference_cat"], "22: Utilities");

        let stored = Archive::at(&path).read_registry().expect("read back");
        assert_eq!(stored.count(EntityType::Process), 1);
        assert_eq!(stored.count(EntityType::Flow), 2);
        assert!(stored.count(EntityType::UnitGroup) > 0);
        assert!(stored.count(EntityType::FlowProperty) > 0);
        assert_eq!(
            stored.count(EntityType::UnitGroup),
            catalog.unit_groups().len()
        );
    }

    #[test]
    fn second_write_merges_without_reseeding() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut first = generation_batch();
        write_archive(&mut first, &catalog, &path).expect("first write");

        let mut second = descriptions(json!({
            "dist": {
                "name": "electricity distribution",
                "category": "22: Utilities",
                "location": "RFCW",
                "exchanges": [
                    {"input": true, "amount": 1.05, "unit": "MWh",
                     "flow": {"name": "electricity", "category": "22: Utilities"}}
                ]
            }
        }));
        let report = write_archive(&mut second, &catalog, &path).expect("second write");

        assert!(!report.seeded);
        let stored = Archive::at(&path).read_registry().expect("read back");
        assert_eq!(stored.count(EntityType::Process), 2);
        // The shared electricity flow resolves to the same identity.
        assert_eq!(stored.count(EntityType::Flow), 2);
        assert_eq!(stored.count(EntityType::Location), 1);
    }

    #[test]
    fn rewriting_same_batch_overrides_in_place() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut first = generation_batch();
        let a = write_archive(&mut first, &catalog, &path).expect("first write");

        let mut again = generation_batch();
        let b = write_archive(&mut again, &catalog, &path).expect("second write");

        assert_eq!(a.entities_written, b.entities_written);
        assert_eq!(
            first["gen"]["uuid"], again["gen"]["uuid"],
            "identity is stable across writes"
        );
    }

    #[test]
    fn malformed_description_is_skipped_and_counted() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut batch = descriptions(json!({
            "good": {"name": "p", "exchanges": []},
            "bad": "not a description"
        }));
        let report = write_archive(&mut batch, &catalog, &path).expect("write");

        assert_eq!(report.processes_built, 1);
        assert_eq!(report.descriptions_skipped, 1);
        let stored = Archive::at(&path).read_registry().expect("read back");
        assert_eq!(stored.count(EntityType::Process), 1);
    }
}
