use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

use crate::config::SummaryConfig;
use crate::summary::frame::{Frame, parse_instant};
use crate::summary::schema::{Dtype, compliance_report};
use crate::summary::types::{ColumnInfo, DatasetSummary, Overview, SampleData};

/// Computes the quality report for `frame` under the resolved `schema`.
///
/// Pure and deterministic: the same rows yield the same report no matter
/// how shards were ordered on disk. The frame is not mutated.
pub fn summarize(
    frame: &Frame,
    schema: &BTreeMap<String, Dtype>,
    cfg: &SummaryConfig,
) -> DatasetSummary {
    let record_count = frame.len() as u64;

    let timestamps: Vec<DateTime<Utc>> = frame
        .column_values("timestamp")
        .map(|values| values.filter_map(parse_instant).collect())
        .unwrap_or_default();
    let start_time = timestamps.iter().min().copied();
    let end_time = timestamps.iter().max().copied();

    let time_span_hours = match (start_time, end_time) {
        (Some(start), Some(end)) if frame.len() > 1 => {
            (end - start).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => 0.0,
    };

    let province_count = frame
        .column_values("requested_province")
        .map(|values| {
            values
                .filter(|v| !v.is_empty())
                .collect::<HashSet<_>>()
                .len()
        })
        .unwrap_or(0);

    // One record is expected per location per sampling interval.
    let expected_intervals =
        (time_span_hours * 60.0 / cfg.sampling_interval_minutes as f64).floor();
    let expected_records = expected_intervals as i64 * province_count as i64;
    let completeness = if expected_records > 0 {
        record_count as f64 / expected_records as f64
    } else {
        0.0
    };

    let has_object_dtype = schema.values().any(|dtype| *dtype == Dtype::Object);

    let mut seen = HashSet::new();
    let mut duplicate_count = 0u64;
    for row in frame.rows() {
        if !seen.insert(row) {
            duplicate_count += 1;
        }
    }

    let columns: BTreeMap<String, ColumnInfo> = frame
        .columns()
        .iter()
        .map(|col| {
            let values: Vec<&str> = frame
                .column_values(col)
                .expect("column exists")
                .collect();
            let non_null_count = values.iter().filter(|v| !v.is_empty()).count() as u64;
            let unique_values = values
                .iter()
                .filter(|v| !v.is_empty())
                .collect::<HashSet<_>>()
                .len() as u64;
            let dtype = schema.get(col).copied().unwrap_or(Dtype::Object);
            (
                col.clone(),
                ColumnInfo {
                    dtype: dtype.name().to_string(),
                    non_null_count,
                    unique_values,
                    missing_values: record_count - non_null_count,
                },
            )
        })
        .collect();

    let order = frame.canonical_order();
    let row_as_map = |idx: usize| {
        frame
            .columns()
            .iter()
            .cloned()
            .zip(frame.rows()[idx].iter().cloned())
            .collect::<BTreeMap<String, String>>()
    };
    let head: Vec<_> = order.first().map(|&i| row_as_map(i)).into_iter().collect();
    let tail: Vec<_> = order.last().map(|&i| row_as_map(i)).into_iter().collect();

    DatasetSummary {
        overview: Overview {
            record_count,
            start_time,
            end_time,
            time_span_hours,
            completeness,
            has_object_dtype,
            duplicate_count,
        },
        columns,
        schema_compliance: compliance_report(schema),
        sample_data: SampleData { head, tail },
    }
}
