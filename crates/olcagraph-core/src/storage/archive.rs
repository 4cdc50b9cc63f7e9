//! # redb-backed Entity Archive
//!
//! A disk-backed archive of root-entity documents using the redb embedded
//! database: one table per entity type, keyed by identifier, holding the
//! serialized JSON document.
//!
//! ## Replace semantics
//!
//! [`Archive::write`] never mutates an existing archive in place. The full
//! merged registry is written to a sibling temp file and renamed over the
//! target, so readers observe either the old archive or the new one,
//! never a partial write. A failed write leaves the target untouched.
//!
//! ## Read tolerance
//!
//! A missing archive is [`OlcaError::ArchiveNotFound`]; callers starting a
//! fresh archive treat it as an empty registry. An unreadable document
//! inside an otherwise healthy archive is skipped with a warning; only a
//! database-level failure is fatal.

use crate::model::RootEntity;
use crate::registry::EntityRegistry;
use crate::types::{EntityType, OlcaError};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Table layout: identifier string -> serialized JSON document bytes.
fn table_for(entity_type: EntityType) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(entity_type.table_name())
}

/// Handle to an archive location on disk.
///
/// Holds the path only; every operation opens the database itself, so a
/// handle for a not-yet-written archive is valid.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    /// Create a handle for the given archive path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an archive file exists at this path.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open_database(&self) -> Result<Database, OlcaError> {
        if !self.exists() {
            return Err(OlcaError::ArchiveNotFound(self.path.display().to_string()));
        }
        Database::open(&self.path).map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))
    }

    /// Read every stored document into a registry.
    ///
    /// Documents are loaded per type in identifier order. A document that
    /// fails to parse, or whose type tag disagrees with the table it was
    /// found in, is skipped with a warning.
    pub fn read_registry(&self) -> Result<EntityRegistry, OlcaError> {
        let db = self.open_database()?;
        let txn = db
            .begin_read()
            .map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?;

        let mut registry = EntityRegistry::new();
        for entity_type in EntityType::ALL {
            let table = match txn.open_table(table_for(entity_type)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => continue,
                Err(e) => return Err(OlcaError::ArchiveCorrupt(e.to_string())),
            };
            for entry in table
                .iter()
                .map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?
            {
                let (key, value) =
                    entry.map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?;
                match serde_json::from_slice::<RootEntity>(value.value()) {
                    Ok(entity) => {
                        if entity.entity_type() != entity_type {
                            tracing::warn!(
                                id = key.value(),
                                table = entity_type.table_name(),
                                "document type disagrees with its table; skipped"
                            );
                            continue;
                        }
                        if !registry.upsert(entity) {
                            tracing::debug!(id = key.value(), "duplicate identifier skipped");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            id = key.value(),
                            table = entity_type.table_name(),
                            error = %e,
                            "unreadable document skipped"
                        );
                    }
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            entities = registry.total(),
            "archive read"
        );
        Ok(registry)
    }

    /// Read identifiers only, without parsing any document.
    ///
    /// Cheap existence scan for callers that need to know what an archive
    /// holds but not what the documents say.
    pub fn read_ids(&self) -> Result<BTreeMap<EntityType, Vec<String>>, OlcaError> {
        let db = self.open_database()?;
        let txn = db
            .begin_read()
            .map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?;

        let mut ids = BTreeMap::new();
        for entity_type in EntityType::ALL {
            let table = match txn.open_table(table_for(entity_type)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => continue,
                Err(e) => return Err(OlcaError::ArchiveCorrupt(e.to_string())),
            };
            let mut keys = Vec::new();
            for entry in table
                .iter()
                .map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?
            {
                let (key, _) = entry.map_err(|e| OlcaError::ArchiveCorrupt(e.to_string()))?;
                keys.push(key.value().to_string());
            }
            ids.insert(entity_type, keys);
        }
        Ok(ids)
    }

    /// Write the full registry, atomically replacing any existing archive.
    pub fn write(&self, registry: &EntityRegistry) -> Result<(), OlcaError> {
        let temp_path = self.path.with_extension("tmp");
        // A stale temp file from an interrupted write is worthless.
        if temp_path.is_file() {
            fs::remove_file(&temp_path).map_err(|e| OlcaError::Io(e.to_string()))?;
        }

        {
            let db = Database::create(&temp_path).map_err(|e| OlcaError::Io(e.to_string()))?;
            let txn = db
                .begin_write()
                .map_err(|e| OlcaError::Io(e.to_string()))?;
            for entity_type in EntityType::ALL {
                let mut table = txn
                    .open_table(table_for(entity_type))
                    .map_err(|e| OlcaError::Io(e.to_string()))?;
                for entity in registry.all_of(entity_type) {
                    let bytes = serde_json::to_vec(entity)
                        .map_err(|e| OlcaError::Serialization(e.to_string()))?;
                    table
                        .insert(entity.id(), bytes.as_slice())
                        .map_err(|e| OlcaError::Io(e.to_string()))?;
                }
            }
            txn.commit().map_err(|e| OlcaError::Io(e.to_string()))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| OlcaError::Io(e.to_string()))?;
        tracing::info!(
            path = %self.path.display(),
            entities = registry.total(),
            "archive written"
        );
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actor, Flow, FlowType};
    use tempfile::tempdir;

    fn actor(id: &str, name: &str) -> RootEntity {
        RootEntity::Actor(Actor {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    fn flow(id: &str, name: &str) -> RootEntity {
        RootEntity::Flow(Flow {
            id: id.to_string(),
            name: Some(name.to_string()),
            category: None,
            flow_type: FlowType::ProductFlow,
            flow_properties: Vec::new(),
        })
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = tempdir().expect("temp dir");
        let archive = Archive::at(temp.path().join("graph.olca"));

        let mut registry = EntityRegistry::new();
        registry.upsert(actor("a1", "NETL"));
        registry.upsert(flow("f1", "electricity"));
        registry.upsert(flow("f2", "fuel"));
        archive.write(&registry).expect("write");

        let restored = archive.read_registry().expect("read");
        assert_eq!(restored.total(), 3);
        assert_eq!(restored.count(EntityType::Flow), 2);
        let stored = restored.get(EntityType::Actor, "a1").expect("actor");
        assert_eq!(stored.name(), Some("NETL"));
    }

    #[test]
    fn missing_archive_is_not_found() {
        let temp = tempdir().expect("temp dir");
        let archive = Archive::at(temp.path().join("absent.olca"));
        assert!(!archive.exists());

        let result = archive.read_registry();
        let not_found = matches!(result, Err(OlcaError::ArchiveNotFound(_)));
        assert!(not_found);
    }

    #[test]
    fn read_ids_skips_document_parsing() {
        let temp = tempdir().expect("temp dir");
        let archive = Archive::at(temp.path().join("graph.olca"));

        let mut registry = EntityRegistry::new();
        registry.upsert(flow("f1", "electricity"));
        registry.upsert(actor("a1", "NETL"));
        archive.write(&registry).expect("write");

        let ids = archive.read_ids().expect("ids");
        assert_eq!(ids.get(&EntityType::Flow).map(Vec::len), Some(1));
        assert_eq!(ids.get(&EntityType::Actor).map(Vec::len), Some(1));
        assert_eq!(
            ids.get(&EntityType::Process).map(Vec::as_slice),
            Some(&[][..])
        );
    }

    #[test]
    fn rewrite_replaces_previous_contents() {
        let temp = tempdir().expect("temp dir");
        let archive = Archive::at(temp.path().join("graph.olca"));

        let mut first = EntityRegistry::new();
        first.upsert(actor("a1", "first"));
        archive.write(&first).expect("write first");

        let mut second = EntityRegistry::new();
        second.upsert(actor("a1", "revised"));
        second.upsert(actor("a2", "added"));
        archive.write(&second).expect("write second");

        let restored = archive.read_registry().expect("read");
        assert_eq!(restored.count(EntityType::Actor), 2);
        let stored = restored.get(EntityType::Actor, "a1").expect("actor");
        assert_eq!(stored.name(), Some("revised"));
    }

    #[test]
    fn unreadable_document_is_skipped() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");

        // Write one good and one garbage document directly.
        {
            let db = Database::create(&path).expect("create db");
            let txn = db.begin_write().expect("begin write");
            {
                let mut table = txn
                    .open_table(table_for(EntityType::Flow))
                    .expect("open table");
                let good = serde_json::to_vec(&flow("f1", "electricity")).expect("serialize");
                table.insert("f1", good.as_slice()).expect("insert");
                table
                    .insert("f2", b"not json at all".as_slice())
                    .expect("insert");
            }
            txn.commit().expect("commit");
        }

        let archive = Archive::at(&path);
        let restored = archive.read_registry().expect("read");
        assert_eq!(restored.count(EntityType::Flow), 1);
        assert!(restored.contains(EntityType::Flow, "f1"));
    }

    #[test]
    fn mistyped_document_is_skipped() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");

        // An actor document sitting in the flows table.
        {
            let db = Database::create(&path).expect("create db");
            let txn = db.begin_write().expect("begin write");
            {
                let mut table = txn
                    .open_table(table_for(EntityType::Flow))
                    .expect("open table");
                let misplaced = serde_json::to_vec(&actor("a1", "NETL")).expect("serialize");
                table.insert("a1", misplaced.as_slice()).expect("insert");
            }
            txn.commit().expect("commit");
        }

        let archive = Archive::at(&path);
        let restored = archive.read_registry().expect("read");
        assert_eq!(restored.total(), 0);
    }

    #[test]
    fn failed_write_leaves_no_temp_behind_next_write() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.olca");
        let archive = Archive::at(&path);

        // Simulate an interrupted earlier write.
        fs::write(path.with_extension("tmp"), b"stale").expect("plant temp");

        let mut registry = EntityRegistry::new();
        registry.upsert(actor("a1", "NETL"));
        archive.write(&registry).expect("write");

        assert!(!path.with_extension("tmp").exists());
        let restored = archive.read_registry().expect("read");
        assert_eq!(restored.total(), 1);
    }
}
