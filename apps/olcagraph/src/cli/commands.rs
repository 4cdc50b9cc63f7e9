//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use olcagraph_core::{
    write_archive, Archive, CatalogSource, EntityType, OlcaError, UnitCatalog,
};
use std::fs;
use std::path::Path;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum input file size for a write batch (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), OlcaError> {
    let metadata = fs::metadata(path)
        .map_err(|e| OlcaError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(OlcaError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Parse an entity type name as given on the command line.
fn parse_entity_type(name: &str) -> Result<EntityType, OlcaError> {
    EntityType::ALL
        .into_iter()
        .find(|t| t.tag().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            OlcaError::UnknownEntityType(format!(
                "'{}' (expected one of: {})",
                name,
                EntityType::ALL.map(|t| t.tag()).join(", ")
            ))
        })
}

// =============================================================================
// WRITE COMMAND
// =============================================================================

/// Build a batch of process descriptions into the archive.
pub fn cmd_write(
    archive_path: &Path,
    file: &Path,
    data_dir: &Path,
    offline: bool,
    annotated: Option<&Path>,
    json_mode: bool,
) -> Result<(), OlcaError> {
    validate_file_size(file, MAX_INPUT_FILE_SIZE)?;
    let bytes = fs::read(file).map_err(|e| OlcaError::Io(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| OlcaError::Serialization(e.to_string()))?;
    let serde_json::Value::Object(mut descriptions) = value else {
        return Err(OlcaError::Serialization(
            "input must be a JSON object mapping names to process descriptions".to_string(),
        ));
    };

    let source = if offline {
        None
    } else {
        Some(CatalogSource::default())
    };
    let catalog = UnitCatalog::load(data_dir, source.as_ref());

    let report = write_archive(&mut descriptions, &catalog, archive_path)?;

    if let Some(out) = annotated {
        let bytes = serde_json::to_vec_pretty(&descriptions)
            .map_err(|e| OlcaError::Serialization(e.to_string()))?;
        fs::write(out, bytes).map_err(|e| OlcaError::Io(e.to_string()))?;
    }

    if json_mode {
        let output = serde_json::json!({
            "archive": archive_path.to_string_lossy(),
            "processes_built": report.processes_built,
            "descriptions_skipped": report.descriptions_skipped,
            "entities_written": report.entities_written,
            "seeded": report.seeded
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Archive: {:?}", archive_path);
    println!("Processes built:   {}", report.processes_built);
    println!("Descriptions skipped: {}", report.descriptions_skipped);
    println!("Entities written:  {}", report.entities_written);
    if report.seeded {
        println!("Reference data seeded (new archive)");
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show per-type entity counts.
pub fn cmd_status(archive_path: &Path, json_mode: bool) -> Result<(), OlcaError> {
    let archive = Archive::at(archive_path);
    let ids = if archive.exists() {
        archive.read_ids()?
    } else {
        // An archive that does not exist yet is just empty.
        Default::default()
    };

    if json_mode {
        let counts: serde_json::Map<String, serde_json::Value> = EntityType::ALL
            .into_iter()
            .map(|t| {
                let count = ids.get(&t).map_or(0, Vec::len);
                (t.tag().to_string(), count.into())
            })
            .collect();
        let output = serde_json::json!({
            "archive": archive_path.to_string_lossy(),
            "exists": archive.exists(),
            "counts": counts
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("olcagraph Archive Status");
    println!("========================");
    println!("Archive: {:?}", archive_path);
    println!();
    for entity_type in EntityType::ALL {
        let count = ids.get(&entity_type).map_or(0, Vec::len);
        println!("{:<14} {}", entity_type.tag(), count);
    }
    Ok(())
}

// =============================================================================
// LS COMMAND
// =============================================================================

/// List stored identifiers, optionally restricted to one type.
pub fn cmd_ls(
    archive_path: &Path,
    entity_type: Option<&str>,
    json_mode: bool,
) -> Result<(), OlcaError> {
    let filter = entity_type.map(parse_entity_type).transpose()?;
    let ids = Archive::at(archive_path).read_ids()?;

    if json_mode {
        let listing: serde_json::Map<String, serde_json::Value> = EntityType::ALL
            .into_iter()
            .filter(|t| filter.is_none_or(|f| f == *t))
            .map(|t| {
                let keys = ids.get(&t).cloned().unwrap_or_default();
                (t.tag().to_string(), keys.into())
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).unwrap_or_default()
        );
        return Ok(());
    }

    for t in EntityType::ALL {
        if filter.is_some_and(|f| f != t) {
            continue;
        }
        let Some(keys) = ids.get(&t) else { continue };
        for id in keys {
            println!("{}\t{}", t.tag(), id);
        }
    }
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print one stored document as pretty JSON.
pub fn cmd_show(archive_path: &Path, entity_type: &str, id: &str) -> Result<(), OlcaError> {
    let entity_type = parse_entity_type(entity_type)?;
    let registry = Archive::at(archive_path).read_registry()?;

    let Some(entity) = registry.get(entity_type, id) else {
        return Err(OlcaError::EntityNotFound(
            entity_type.tag().to_string(),
            id.to_string(),
        ));
    };
    println!(
        "{}",
        serde_json::to_string_pretty(entity).unwrap_or_default()
    );
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
