//! Summary report generation: load shards, summarize, persist.

use anyhow::{Result, bail};
use std::path::Path;
use tracing::{info, warn};

use crate::config::SummaryConfig;
use crate::output::write_json_file;
use crate::s3::write_json_to_s3;
use crate::summary::loader::load_dataset;
use crate::summary::summarize::summarize;
use crate::summary::types::DatasetSummary;

/// Object-store key the summary document is written to.
pub const SUMMARY_KEY: &str = "reports/summary.json";

/// Loads the dataset under `data_dir`, computes the quality report,
/// writes it to `output` and optionally uploads it to S3.
pub async fn generate_summary_report(
    data_dir: &Path,
    output: &Path,
    cfg: &SummaryConfig,
    s3_bucket: Option<&str>,
) -> Result<DatasetSummary> {
    let dataset = load_dataset(data_dir)?;
    if dataset.frame.is_empty() {
        warn!(data_dir = %data_dir.display(), "No data shards found");
        bail!("no data shards found under {}", data_dir.display());
    }

    let summary = summarize(&dataset.frame, &dataset.schema, cfg);
    write_json_file(output, &summary)?;
    info!(
        record_count = summary.overview.record_count,
        duplicate_count = summary.overview.duplicate_count,
        overall_compliance = summary.schema_compliance.overall_compliance,
        path = %output.display(),
        "Summary report written"
    );

    if let Some(bucket) = s3_bucket {
        let config = aws_config::load_from_env().await;
        let s3 = aws_sdk_s3::Client::new(&config);
        write_json_to_s3(&s3, bucket, SUMMARY_KEY, &summary).await?;
        info!(bucket, key = SUMMARY_KEY, "Summary report uploaded");
    }

    Ok(summary)
}
