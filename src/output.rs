//! Persistence for collected records and generated reports.
//!
//! Records land in hive-partitioned CSV shards under the dataset root,
//! with a `_schema.json` sidecar declaring each column's dtype.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::record::WeatherRecord;
use crate::summary::schema::EXPECTED_SCHEMA;

/// Appends a [`WeatherRecord`] to its partition shard under `data_dir`.
///
/// Creates the partition directory and the shard (with headers) on first
/// write, and makes sure the schema sidecar exists at the dataset root.
/// Returns the shard path.
pub fn append_record(data_dir: &Path, record: &WeatherRecord) -> Result<PathBuf> {
    let partition = data_dir.join(record.partition_dir());
    std::fs::create_dir_all(&partition)?;

    let path = partition.join("data.csv");
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(&path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    ensure_schema_sidecar(data_dir)?;

    Ok(path)
}

/// Writes the `_schema.json` sidecar at the dataset root if absent.
pub fn ensure_schema_sidecar(data_dir: &Path) -> Result<PathBuf> {
    let path = data_dir.join("_schema.json");
    if !path.exists() {
        let declared: BTreeMap<&str, &str> = EXPECTED_SCHEMA
            .iter()
            .map(|(col, dtype)| (*col, dtype.name()))
            .collect();
        std::fs::write(&path, serde_json::to_vec_pretty(&declared)?)?;
    }
    Ok(path)
}

/// Writes `value` as pretty-printed JSON to `path`, creating parent
/// directories as needed.
pub fn write_json_file(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}
