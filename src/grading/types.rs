//! Data types of the grading document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final grading document, written as `reports/grading_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSummary {
    /// Criterion name → awarded score.
    pub overview: BTreeMap<String, f64>,
    /// Criterion name → human-readable explanation.
    pub details: BTreeMap<String, String>,
    pub total: TotalScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalScore {
    pub score: f64,
    pub max_score: f64,
}
