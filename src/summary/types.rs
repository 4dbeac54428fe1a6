//! Data types of the summary report.
//!
//! Field names are the external contract: the grader reads the document
//! back by these names. Maps are `BTreeMap` so two runs over the same
//! dataset serialize byte-identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete quality report over one dataset snapshot, written as
/// `reports/summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub overview: Overview,
    pub columns: BTreeMap<String, ColumnInfo>,
    pub schema_compliance: SchemaCompliance,
    pub sample_data: SampleData,
}

/// Headline dataset statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub record_count: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub time_span_hours: f64,
    /// Actual over expected record count; 0 when nothing is expected.
    pub completeness: f64,
    pub has_object_dtype: bool,
    pub duplicate_count: u64,
}

/// Per-column detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub dtype: String,
    pub non_null_count: u64,
    pub unique_values: u64,
    pub missing_values: u64,
}

/// Per-column compliance percentages and their mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaCompliance {
    pub compliance_report: BTreeMap<String, f64>,
    pub overall_compliance: f64,
}

/// First and last rows in canonical order, raw cells keyed by column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleData {
    pub head: Vec<BTreeMap<String, String>>,
    pub tail: Vec<BTreeMap<String, String>>,
}
