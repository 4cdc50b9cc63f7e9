//! # Write Cycle Tests
//!
//! End-to-end coverage of the build-merge-write pipeline against a real
//! on-disk archive: first write with reference seeding, incremental
//! batches, in-place override on rebuild, and identifier-only scans.

use olcagraph_core::{write_archive, Archive, EntityType, RootEntity, UnitCatalog};
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn batch(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn generation(version: &str) -> serde_json::Map<String, serde_json::Value> {
    batch(json!({
        "gen": {
            "name": "electricity generation",
            "category": "22: Utilities",
            "location": "RFCW",
            "version": version,
            "processDocumentation": {
                "timeDescription": "2016 annual averages",
                "validFrom": "1/1/2016",
                "validUntil": "12/31/2016",
                "dataGenerator": "Jane Analyst",
                "sources": [
                    {"Name": "eGRID 2016", "Category": ["data"], "Year": 2018}
                ]
            },
            "exchanges": [
                {"input": true, "amount": 2.5, "unit": "MJ",
                 "flow": {"name": "fuel", "category": "21: Mining"},
                 "uncertainty": {
                     "distributionType": "Logarithmic Normal Distribution",
                     "geomMean": "3.2", "geomSd": "1.1"
                 }},
                {"quantitativeReference": true, "amount": 1, "unit": "MWh",
                 "flow": {"name": "electricity", "category": "22: Utilities"}}
            ]
        }
    }))
}

fn read(path: &Path) -> olcagraph_core::EntityRegistry {
    Archive::at(path).read_registry().expect("read archive")
}

// =============================================================================
// FIRST WRITE
// =============================================================================

mod first_write {
    use super::*;

    #[test]
    fn builds_full_entity_graph() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut descriptions = generation("1.0");
        let report = write_archive(&mut descriptions, &catalog, &path).expect("write");
        assert!(report.seeded);
        assert_eq!(report.processes_built, 1);

        let stored = read(&path);
        assert_eq!(stored.count(EntityType::Process), 1);
        assert_eq!(stored.count(EntityType::Flow), 2);
        assert_eq!(stored.count(EntityType::Location), 1);
        assert_eq!(stored.count(EntityType::Actor), 1);
        assert_eq!(stored.count(EntityType::Source), 1);
        assert_eq!(
            stored.count(EntityType::UnitGroup),
            catalog.unit_groups().len()
        );
    }

    #[test]
    fn resolved_process_carries_exchange_details() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut descriptions = generation("1.0");
        write_archive(&mut descriptions, &catalog, &path).expect("write");

        let uuid = descriptions["gen"]["uuid"].as_str().expect("uuid");
        let stored = read(&path);
        let process = stored.process(uuid).expect("stored process");

        assert_eq!(process.exchanges.len(), 2);
        let fuel = &process.exchanges[0];
        assert!(fuel.is_input);
        assert_eq!(fuel.amount, 2.5);
        assert_eq!(fuel.unit.as_ref().and_then(|u| u.name.as_deref()), Some("MJ"));
        let uncertainty = fuel.uncertainty.as_ref().expect("uncertainty");
        assert_eq!(uncertainty.geom_mean, Some(3.2));

        let reference = process.quantitative_reference().expect("reference");
        assert_eq!(reference.flow.name.as_deref(), Some("electricity"));
        assert_eq!(
            descriptions["gen"]["q_reference_id"].as_str(),
            Some(reference.flow.id.as_str())
        );
    }

    #[test]
    fn documentation_dates_are_normalized() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut descriptions = generation("1.0");
        write_archive(&mut descriptions, &catalog, &path).expect("write");

        let uuid = descriptions["gen"]["uuid"].as_str().expect("uuid");
        let stored = read(&path);
        let process = stored.process(uuid).expect("stored process");
        let doc = process.process_documentation.as_ref().expect("doc");

        assert_eq!(doc.valid_from.as_deref(), Some("2016-01-01T00:00:00"));
        assert_eq!(doc.valid_until.as_deref(), Some("2016-12-31T00:00:00"));
        assert!(doc.creation_date.is_some());
    }
}

// =============================================================================
// INCREMENTAL BATCHES
// =============================================================================

mod incremental {
    use super::*;

    #[test]
    fn second_batch_extends_the_graph() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        write_archive(&mut generation("1.0"), &catalog, &path).expect("first write");

        let mut second = batch(json!({
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

        let stored = read(&path);
        assert_eq!(stored.count(EntityType::Process), 2);
        // Shared flow and location resolve to the same identities.
        assert_eq!(stored.count(EntityType::Flow), 2);
        assert_eq!(stored.count(EntityType::Location), 1);
    }

    #[test]
    fn rebuild_overrides_in_place_and_keeps_identity() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut first = generation("1.0");
        write_archive(&mut first, &catalog, &path).expect("first write");
        let before = read(&path);

        let mut revised = generation("2.0");
        write_archive(&mut revised, &catalog, &path).expect("second write");
        let after = read(&path);

        assert_eq!(first["gen"]["uuid"], revised["gen"]["uuid"]);
        assert_eq!(before.total(), after.total());

        let uuid = revised["gen"]["uuid"].as_str().expect("uuid");
        let process = after.process(uuid).expect("stored process");
        assert_eq!(process.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn provider_chains_link_across_one_batch() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut descriptions = batch(json!({
            "trans": {
                "name": "transmission",
                "category": "22: Utilities",
                "location": "US",
                "exchanges": [
                    {"input": true, "amount": 1, "unit": "MWh",
                     "flow": {"name": "electricity", "category": "22: Utilities"},
                     "provider": {
                         "name": "generation",
                         "category": "22: Utilities",
                         "location": "US",
                         "exchanges": []
                     }}
                ]
            }
        }));
        write_archive(&mut descriptions, &catalog, &path).expect("write");

        let stored = read(&path);
        assert_eq!(stored.count(EntityType::Process), 2);

        let uuid = descriptions["trans"]["uuid"].as_str().expect("uuid");
        let process = stored.process(uuid).expect("stored process");
        let provider = process.exchanges[0]
            .default_provider
            .as_ref()
            .expect("provider");
        assert!(stored.process(&provider.id).is_some());
    }
}

// =============================================================================
// CORRUPTION
// =============================================================================

mod corruption {
    use super::*;
    use olcagraph_core::OlcaError;
    use std::fs;

    #[test]
    fn corrupt_archive_aborts_the_write_and_is_left_untouched() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        fs::write(&path, b"this is not a database").expect("plant file");
        let before = fs::read(&path).expect("read planted bytes");

        let catalog = UnitCatalog::bundled();
        let result = write_archive(&mut generation("1.0"), &catalog, &path);
        assert!(matches!(result, Err(OlcaError::ArchiveCorrupt(_))));

        let after = fs::read(&path).expect("read bytes after failed write");
        assert_eq!(before, after);
        assert!(!path.with_extension("tmp").exists());
    }
}

// =============================================================================
// IDENTIFIER SCANS
// =============================================================================

mod identifier_scans {
    use super::*;

    #[test]
    fn ids_match_full_documents() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        let mut descriptions = generation("1.0");
        write_archive(&mut descriptions, &catalog, &path).expect("write");

        let ids = Archive::at(&path).read_ids().expect("ids");
        let stored = read(&path);
        for entity_type in EntityType::ALL {
            let scanned = ids.get(&entity_type).map_or(0, Vec::len);
            assert_eq!(scanned, stored.count(entity_type), "{entity_type}");
        }
    }

    #[test]
    fn stored_documents_keep_their_type_tag() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let catalog = UnitCatalog::bundled();

        write_archive(&mut generation("1.0"), &catalog, &path).expect("write");

        let stored = read(&path);
        for entity_type in EntityType::ALL {
            for entity in stored.all_of(entity_type) {
                let value = serde_json::to_value(entity).expect("serialize");
                assert_eq!(value["@type"], entity_type.tag());
                let restored: RootEntity =
                    serde_json::from_value(value).expect("deserialize");
                assert_eq!(restored.id(), entity.id());
            }
        }
    }
}
