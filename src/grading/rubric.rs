use chrono::Duration;
use std::collections::BTreeMap;

use crate::config::GradingConfig;
use crate::grading::types::{GradingSummary, TotalScore};
use crate::services::repo_host::RepositoryMetadata;
use crate::summary::types::DatasetSummary;
use crate::summary::utility::mean;

/// Points carried by every criterion.
pub const CRITERION_POINTS: f64 = 10.0;

/// Everything an evaluator may look at. Either input may be absent; the
/// affected criteria then score zero with a message instead of failing
/// the run.
pub struct GradingInputs<'a> {
    pub summary: Option<&'a DatasetSummary>,
    pub repository: Option<&'a RepositoryMetadata>,
    pub config: &'a GradingConfig,
}

pub struct CriterionResult {
    pub score: f64,
    pub message: String,
}

impl CriterionResult {
    fn new(score: f64, message: impl Into<String>) -> Self {
        Self {
            score,
            message: message.into(),
        }
    }
}

type Evaluator = fn(&GradingInputs) -> CriterionResult;

/// The rubric. All criteria carry equal weight; the two graded ones
/// (`commits`, `readme`) award fractional points, the rest are binary.
static RUBRIC: &[(&str, Evaluator)] = &[
    ("repository", grade_repository),
    ("commits", grade_commits),
    ("readme", grade_readme),
    ("record_count", grade_record_count),
    ("time_span", grade_time_span),
    ("completeness", grade_completeness),
    ("no_object_dtype", grade_no_object_dtype),
    ("no_duplicates", grade_no_duplicates),
    ("schema_compliance", grade_schema_compliance),
];

/// Maximum total the rubric can award.
pub fn max_score() -> f64 {
    RUBRIC.len() as f64 * CRITERION_POINTS
}

/// Scores every criterion and assembles the grading document.
pub fn final_grading(
    summary: Option<&DatasetSummary>,
    repository: Option<&RepositoryMetadata>,
    config: &GradingConfig,
) -> GradingSummary {
    let inputs = GradingInputs {
        summary,
        repository,
        config,
    };

    let mut overview = BTreeMap::new();
    let mut details = BTreeMap::new();
    let mut total = 0.0;

    for (name, evaluate) in RUBRIC {
        let result = evaluate(&inputs);
        total += result.score;
        overview.insert(name.to_string(), result.score);
        details.insert(name.to_string(), result.message);
    }

    GradingSummary {
        overview,
        details,
        total: TotalScore {
            score: total,
            max_score: max_score(),
        },
    }
}

/// Full points when `value` meets `threshold`, else zero. Shared by the
/// binary dataset criteria.
fn check_minimum(value: f64, threshold: f64) -> f64 {
    if value >= threshold {
        CRITERION_POINTS
    } else {
        0.0
    }
}

fn grade_repository(inputs: &GradingInputs) -> CriterionResult {
    let Some(repo) = inputs.repository else {
        return CriterionResult::new(0.0, "Repository metadata unavailable.");
    };

    let first_week_end = inputs.config.project_start + Duration::days(7);
    let on_time = repo.created_at <= first_week_end;
    let correct_name = repo.name == inputs.config.expected_repo_name;

    if on_time && correct_name {
        CriterionResult::new(
            CRITERION_POINTS,
            "Repository created on time with correct name.",
        )
    } else {
        CriterionResult::new(0.0, "Repository not created on time or incorrect name.")
    }
}

fn grade_commits(inputs: &GradingInputs) -> CriterionResult {
    let Some(repo) = inputs.repository else {
        return CriterionResult::new(0.0, "Repository metadata unavailable.");
    };

    let threshold = inputs.config.commits_per_week_full_score as f64;
    let scores: Vec<f64> = repo
        .weekly_commits
        .iter()
        .map(|&count| (count as f64 / threshold * CRITERION_POINTS).min(CRITERION_POINTS))
        .collect();

    CriterionResult::new(
        mean(&scores),
        format!("Weekly commits: {:?}", repo.weekly_commits),
    )
}

fn grade_readme(inputs: &GradingInputs) -> CriterionResult {
    let Some(repo) = inputs.repository else {
        return CriterionResult::new(0.0, "Repository metadata unavailable.");
    };

    let score = (repo.readme_chars as f64 / inputs.config.min_readme_chars as f64
        * CRITERION_POINTS)
        .min(CRITERION_POINTS);

    CriterionResult::new(score, format!("README characters: {}", repo.readme_chars))
}

fn grade_record_count(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    let score = check_minimum(
        summary.overview.record_count as f64,
        inputs.config.min_record_count as f64,
    );
    let message = if score > 0.0 {
        "Sufficient record count."
    } else {
        "Insufficient record count."
    };
    CriterionResult::new(score, message)
}

fn grade_time_span(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    let score = check_minimum(
        summary.overview.time_span_hours,
        inputs.config.min_time_span_hours,
    );
    let message = if score > 0.0 {
        "Sufficient time span."
    } else {
        "Insufficient time span."
    };
    CriterionResult::new(score, message)
}

fn grade_completeness(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    let score = check_minimum(summary.overview.completeness, inputs.config.min_completeness);
    let message = if score > 0.0 {
        "Data completeness meets requirements."
    } else {
        "Data completeness below requirements."
    };
    CriterionResult::new(score, message)
}

fn grade_no_object_dtype(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    if summary.overview.has_object_dtype {
        CriterionResult::new(0.0, "Object data types found.")
    } else {
        CriterionResult::new(CRITERION_POINTS, "No object data types found.")
    }
}

fn grade_no_duplicates(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    let duplicates = summary.overview.duplicate_count;
    if duplicates == 0 {
        CriterionResult::new(CRITERION_POINTS, "No duplicate rows found.")
    } else {
        CriterionResult::new(0.0, format!("{duplicates} duplicate rows found."))
    }
}

fn grade_schema_compliance(inputs: &GradingInputs) -> CriterionResult {
    let Some(summary) = inputs.summary else {
        return CriterionResult::new(0.0, "No dataset summary found.");
    };

    // Exact: near-compliance earns nothing.
    if summary.schema_compliance.overall_compliance == 100.0 {
        CriterionResult::new(CRITERION_POINTS, "Schema fully compliant.")
    } else {
        CriterionResult::new(0.0, "Schema not fully compliant.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::types::{Overview, SampleData, SchemaCompliance};
    use chrono::{TimeZone, Utc};

    fn passing_summary() -> DatasetSummary {
        DatasetSummary {
            overview: Overview {
                record_count: 1200,
                start_time: Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()),
                end_time: Some(Utc.with_ymd_and_hms(2025, 5, 2, 6, 0, 0).unwrap()),
                time_span_hours: 30.0,
                completeness: 0.95,
                has_object_dtype: false,
                duplicate_count: 0,
            },
            columns: BTreeMap::new(),
            schema_compliance: SchemaCompliance {
                compliance_report: BTreeMap::new(),
                overall_compliance: 100.0,
            },
            sample_data: SampleData {
                head: vec![],
                tail: vec![],
            },
        }
    }

    fn passing_repository(config: &GradingConfig) -> RepositoryMetadata {
        RepositoryMetadata {
            name: config.expected_repo_name.clone(),
            created_at: config.project_start + Duration::days(3),
            weekly_commits: vec![5, 5, 5],
            readme_chars: 1000,
        }
    }

    #[test]
    fn test_everything_at_maximum_totals_ninety() {
        let config = GradingConfig::default();
        let summary = passing_summary();
        let repository = passing_repository(&config);

        let grading = final_grading(Some(&summary), Some(&repository), &config);

        assert_eq!(grading.total.max_score, 90.0);
        assert_eq!(grading.total.score, 90.0);
        for (criterion, score) in &grading.overview {
            assert_eq!(*score, 10.0, "criterion {criterion} below maximum");
        }
    }

    #[test]
    fn test_total_is_sum_of_criteria() {
        let config = GradingConfig::default();
        let summary = passing_summary();

        let grading = final_grading(Some(&summary), None, &config);

        let sum: f64 = grading.overview.values().sum();
        assert_eq!(grading.total.score, sum);
        // repository, commits and readme are zeroed without metadata
        assert_eq!(grading.overview["repository"], 0.0);
        assert_eq!(grading.total.score, 60.0);
    }

    #[test]
    fn test_commit_score_averages_weekly_partial_credit() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.weekly_commits = vec![0, 2, 10];

        let grading = final_grading(None, Some(&repository), &config);

        // per-week scores [0, 4, 10] -> mean 14/3
        assert!((grading.overview["commits"] - 14.0 / 3.0).abs() < 1e-9);
        assert_eq!(grading.details["commits"], "Weekly commits: [0, 2, 10]");
    }

    #[test]
    fn test_empty_commit_history_scores_zero() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.weekly_commits = vec![];

        let grading = final_grading(None, Some(&repository), &config);
        assert_eq!(grading.overview["commits"], 0.0);
    }

    #[test]
    fn test_readme_partial_credit_is_proportional() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.readme_chars = 500;

        let grading = final_grading(None, Some(&repository), &config);
        assert_eq!(grading.overview["readme"], 5.0);
    }

    #[test]
    fn test_readme_caps_at_criterion_points() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.readme_chars = 5000;

        let grading = final_grading(None, Some(&repository), &config);
        assert_eq!(grading.overview["readme"], 10.0);
    }

    #[test]
    fn test_repository_late_creation_scores_zero() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.created_at = config.project_start + Duration::days(8);

        let grading = final_grading(None, Some(&repository), &config);
        assert_eq!(grading.overview["repository"], 0.0);
    }

    #[test]
    fn test_repository_wrong_name_scores_zero() {
        let config = GradingConfig::default();
        let mut repository = passing_repository(&config);
        repository.name = "some_other_repo".to_string();

        let grading = final_grading(None, Some(&repository), &config);
        assert_eq!(grading.overview["repository"], 0.0);
    }

    #[test]
    fn test_near_compliance_earns_nothing() {
        let config = GradingConfig::default();
        let mut summary = passing_summary();
        summary.schema_compliance.overall_compliance = 99.9;

        let grading = final_grading(Some(&summary), None, &config);
        assert_eq!(grading.overview["schema_compliance"], 0.0);
        assert_eq!(grading.details["schema_compliance"], "Schema not fully compliant.");
    }

    #[test]
    fn test_duplicates_reported_with_count() {
        let config = GradingConfig::default();
        let mut summary = passing_summary();
        summary.overview.duplicate_count = 3;

        let grading = final_grading(Some(&summary), None, &config);
        assert_eq!(grading.overview["no_duplicates"], 0.0);
        assert_eq!(grading.details["no_duplicates"], "3 duplicate rows found.");
    }

    #[test]
    fn test_missing_summary_zeroes_dataset_criteria_with_message() {
        let config = GradingConfig::default();
        let repository = passing_repository(&config);

        let grading = final_grading(None, Some(&repository), &config);

        for criterion in [
            "record_count",
            "time_span",
            "completeness",
            "no_object_dtype",
            "no_duplicates",
            "schema_compliance",
        ] {
            assert_eq!(grading.overview[criterion], 0.0);
            assert_eq!(grading.details[criterion], "No dataset summary found.");
        }
        assert_eq!(grading.total.score, 30.0);
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        let config = GradingConfig::default();
        let mut summary = passing_summary();
        summary.overview.record_count = 1000;
        summary.overview.time_span_hours = 24.0;
        summary.overview.completeness = 0.9;

        let grading = final_grading(Some(&summary), None, &config);
        assert_eq!(grading.overview["record_count"], 10.0);
        assert_eq!(grading.overview["time_span"], 10.0);
        assert_eq!(grading.overview["completeness"], 10.0);

        summary.overview.record_count = 999;
        summary.overview.time_span_hours = 23.9;
        summary.overview.completeness = 0.89;

        let grading = final_grading(Some(&summary), None, &config);
        assert_eq!(grading.overview["record_count"], 0.0);
        assert_eq!(grading.overview["time_span"], 0.0);
        assert_eq!(grading.overview["completeness"], 0.0);
    }
}
