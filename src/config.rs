//! Injected configuration for the collector, summarizer and grader.
//!
//! Rubric thresholds and sampling constants live in plain structs with
//! `Default` impls carrying the canonical values, so tests and callers can
//! override them without touching globals. Secrets (API keys, tokens) are
//! read from the environment in `main`, never stored here.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Thresholds for the grading rubric.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Official start of the project; the repository must exist within a
    /// week of this instant.
    pub project_start: DateTime<Utc>,
    pub expected_repo_name: String,
    pub min_record_count: u64,
    pub min_time_span_hours: f64,
    pub min_completeness: f64,
    pub min_readme_chars: u64,
    /// Commits per week needed for a full commit score.
    pub commits_per_week_full_score: u64,
    /// Number of weekly buckets the commit score averages over.
    pub tracked_weeks: usize,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            project_start: Utc.with_ymd_and_hms(2025, 4, 28, 0, 0, 0).unwrap(),
            expected_repo_name: "dsi321_2025".to_string(),
            min_record_count: 1000,
            min_time_span_hours: 24.0,
            min_completeness: 0.9,
            min_readme_chars: 1000,
            commits_per_week_full_score: 5,
            tracked_weeks: 3,
        }
    }
}

/// Constants the summarizer needs to judge completeness.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Expected gap between consecutive samples of one location.
    pub sampling_interval_minutes: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sampling_interval_minutes: 5,
        }
    }
}

/// UTC offset applied to `created_at` on collected records.
pub const LOCAL_UTC_OFFSET_HOURS: i32 = 7;

/// Returns the fixed local offset used for `created_at`.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_UTC_OFFSET_HOURS * 3600).expect("offset within bounds")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Catalog of sampling locations, keyed by province name.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "Bangkok": { "lat": 13.7367, "lon": 100.5232 },
///   "Phuket": { "lat": 7.9519, "lon": 98.3381 }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocationConfig {
    entries: BTreeMap<String, Coordinates>,
}

impl LocationConfig {
    /// Loads the catalog from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, Coordinates> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }

    /// Iterates over all `(province, coordinates)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Coordinates)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationConfig {
    /// The four provinces sampled when no catalog file is given.
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Pathum Thani".to_string(),
            Coordinates {
                lat: 14.0134,
                lon: 100.5304,
            },
        );
        entries.insert(
            "Bangkok".to_string(),
            Coordinates {
                lat: 13.7367,
                lon: 100.5232,
            },
        );
        entries.insert(
            "Chiang Mai".to_string(),
            Coordinates {
                lat: 18.7883,
                lon: 98.9853,
            },
        );
        entries.insert(
            "Phuket".to_string(),
            Coordinates {
                lat: 7.9519,
                lon: 98.3381,
            },
        );
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locations() {
        let cfg = LocationConfig::default();
        assert_eq!(cfg.len(), 4);
        assert!(cfg.iter().any(|(name, _)| name == "Bangkok"));
    }

    #[test]
    fn test_location_config_from_json() {
        let json = r#"{"Khon Kaen": {"lat": 16.4419, "lon": 102.8360}}"#;
        let entries: BTreeMap<String, Coordinates> = serde_json::from_str(json).unwrap();
        let cfg = LocationConfig { entries };
        let (name, coords) = cfg.iter().next().unwrap();
        assert_eq!(name, "Khon Kaen");
        assert!((coords.lat - 16.4419).abs() < 1e-9);
    }

    #[test]
    fn test_grading_defaults() {
        let cfg = GradingConfig::default();
        assert_eq!(cfg.min_record_count, 1000);
        assert_eq!(cfg.commits_per_week_full_score, 5);
        assert_eq!(cfg.tracked_weeks, 3);
    }
}
