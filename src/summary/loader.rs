//! Loads a partitioned dataset from disk into a [`Frame`] plus resolved
//! schema.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::summary::frame::Frame;
use crate::summary::schema::{Dtype, observed_schema};

/// A materialized dataset: raw rows plus the dtype resolved per column.
pub struct Dataset {
    pub frame: Frame,
    pub schema: BTreeMap<String, Dtype>,
}

/// Reads every CSV shard under `data_dir` (walked in sorted path order)
/// and resolves the schema from the `_schema.json` sidecar, falling back
/// to inference for undeclared columns.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    let mut paths = Vec::new();
    collect_csv_paths(data_dir, &mut paths)
        .with_context(|| format!("failed to walk dataset at {}", data_dir.display()))?;
    paths.sort();

    let mut frame = Frame::new();
    for path in &paths {
        let file = File::open(path)?;
        let added = frame.append_csv(file)?;
        debug!(path = %path.display(), rows = added, "Shard loaded");
    }

    let declared = read_schema_sidecar(data_dir)?;
    let schema = observed_schema(&frame, declared.as_ref());

    Ok(Dataset { frame, schema })
}

fn collect_csv_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_csv_paths(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            out.push(path);
        }
    }
    Ok(())
}

fn read_schema_sidecar(data_dir: &Path) -> Result<Option<BTreeMap<String, Dtype>>> {
    let path = data_dir.join("_schema.json");
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let names: BTreeMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("malformed schema sidecar at {}", path.display()))?;

    Ok(Some(
        names
            .into_iter()
            .map(|(col, name)| (col, Dtype::from_name(&name)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dataset(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("weather_grader_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_walks_nested_partitions() {
        let dir = temp_dataset("loader_walk");
        let shard_dir = dir.join("year=2025/month=5/day=3/hour=8");
        fs::create_dir_all(&shard_dir).unwrap();
        fs::write(
            shard_dir.join("data.csv"),
            "timestamp,humidity\n2025-05-03T08:00:00+00:00,64\n",
        )
        .unwrap();

        let dataset = load_dataset(&dir).unwrap();
        assert_eq!(dataset.frame.len(), 1);
        assert_eq!(dataset.schema.get("humidity"), Some(&Dtype::Int64));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sidecar_overrides_inference() {
        let dir = temp_dataset("loader_sidecar");
        fs::write(
            dir.join("data.csv"),
            "timestamp,humidity\n2025-05-03T08:00:00+00:00,64\n",
        )
        .unwrap();
        fs::write(
            dir.join("_schema.json"),
            r#"{"timestamp": "timestamp", "humidity": "float64"}"#,
        )
        .unwrap();

        let dataset = load_dataset(&dir).unwrap();
        assert_eq!(dataset.schema.get("humidity"), Some(&Dtype::Float64));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dataset_dir_is_an_error() {
        let dir = env::temp_dir().join("weather_grader_does_not_exist");
        assert!(load_dataset(&dir).is_err());
    }
}
