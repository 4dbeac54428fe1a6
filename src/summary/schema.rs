//! Declared dtypes, the expected dataset schema, and compliance checks.

use std::collections::BTreeMap;
use std::fmt;

use crate::summary::frame::{Frame, parse_instant};
use crate::summary::types::SchemaCompliance;
use crate::summary::utility::mean;

/// Declared column type. `Object` is the untyped bucket: unknown declared
/// names, mixed-type columns, and columns with no values all land there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Int64,
    Float64,
    Str,
    Timestamp,
    Object,
}

impl Dtype {
    pub fn name(self) -> &'static str {
        match self {
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
            Dtype::Str => "string",
            Dtype::Timestamp => "timestamp",
            Dtype::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "int64" => Dtype::Int64,
            "float64" => Dtype::Float64,
            "string" => Dtype::Str,
            "timestamp" => Dtype::Timestamp,
            _ => Dtype::Object,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected schema of the weather dataset, in record column order.
pub static EXPECTED_SCHEMA: &[(&str, Dtype)] = &[
    ("timestamp", Dtype::Timestamp),
    ("year", Dtype::Int64),
    ("month", Dtype::Int64),
    ("day", Dtype::Int64),
    ("hour", Dtype::Int64),
    ("minute", Dtype::Int64),
    ("created_at", Dtype::Timestamp),
    ("requested_province", Dtype::Str),
    ("location", Dtype::Str),
    ("weather_main", Dtype::Str),
    ("weather_description", Dtype::Str),
    ("temperature", Dtype::Float64),
    ("humidity", Dtype::Int64),
    ("wind_speed", Dtype::Float64),
];

fn classify_cell(value: &str) -> Dtype {
    if value.parse::<i64>().is_ok() {
        Dtype::Int64
    } else if value.parse::<f64>().is_ok() {
        Dtype::Float64
    } else if parse_instant(value).is_some() {
        Dtype::Timestamp
    } else {
        Dtype::Str
    }
}

/// Infers a column dtype from its non-missing cells.
///
/// A homogeneous parse class wins; int mixed with float widens to
/// `Float64`; any other mixture, or a column with no values, is `Object`.
pub fn infer_dtype<'a, I>(values: I) -> Dtype
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Option<Dtype> = None;
    for value in values {
        if value.is_empty() {
            continue;
        }
        let class = classify_cell(value);
        seen = Some(match seen {
            None => class,
            Some(prev) if prev == class => class,
            Some(Dtype::Int64) if class == Dtype::Float64 => Dtype::Float64,
            Some(Dtype::Float64) if class == Dtype::Int64 => Dtype::Float64,
            Some(_) => return Dtype::Object,
        });
    }
    seen.unwrap_or(Dtype::Object)
}

/// Resolves the dtype of every frame column: the declared sidecar entry
/// wins, inference covers the rest.
pub fn observed_schema(
    frame: &Frame,
    declared: Option<&BTreeMap<String, Dtype>>,
) -> BTreeMap<String, Dtype> {
    frame
        .columns()
        .iter()
        .map(|col| {
            let dtype = declared
                .and_then(|d| d.get(col).copied())
                .unwrap_or_else(|| {
                    infer_dtype(frame.column_values(col).expect("column exists"))
                });
            (col.clone(), dtype)
        })
        .collect()
}

/// Scores every expected column: 100.0 iff present with exactly the
/// expected dtype, else 0.0. Overall is the mean over all expected
/// columns, missing ones included.
pub fn compliance_report(observed: &BTreeMap<String, Dtype>) -> SchemaCompliance {
    let mut report = BTreeMap::new();
    for (col, expected) in EXPECTED_SCHEMA {
        let pct = match observed.get(*col) {
            Some(dtype) if dtype == expected => 100.0,
            _ => 0.0,
        };
        report.insert(col.to_string(), pct);
    }

    let scores: Vec<f64> = report.values().copied().collect();
    SchemaCompliance {
        overall_compliance: mean(&scores),
        compliance_report: report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_homogeneous_columns() {
        assert_eq!(infer_dtype(["1", "2", "-3"]), Dtype::Int64);
        assert_eq!(infer_dtype(["1.5", "2.25"]), Dtype::Float64);
        assert_eq!(infer_dtype(["light rain", "clear sky"]), Dtype::Str);
        assert_eq!(
            infer_dtype(["2025-05-03T08:00:00+00:00", "2025-05-03T15:00:00+07:00"]),
            Dtype::Timestamp
        );
    }

    #[test]
    fn test_infer_int_float_widens() {
        assert_eq!(infer_dtype(["1", "2.5"]), Dtype::Float64);
        assert_eq!(infer_dtype(["2.5", "1"]), Dtype::Float64);
    }

    #[test]
    fn test_infer_mixed_is_object() {
        assert_eq!(infer_dtype(["1", "clear sky"]), Dtype::Object);
        assert_eq!(infer_dtype(["2025-05-03T08:00:00+00:00", "7"]), Dtype::Object);
    }

    #[test]
    fn test_infer_empty_column_is_object() {
        assert_eq!(infer_dtype(["", ""]), Dtype::Object);
        assert_eq!(infer_dtype(std::iter::empty::<&str>()), Dtype::Object);
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        assert_eq!(infer_dtype(["1", "", "2"]), Dtype::Int64);
    }

    #[test]
    fn test_unknown_declared_name_is_object() {
        assert_eq!(Dtype::from_name("datetime64[ns]"), Dtype::Object);
        assert_eq!(Dtype::from_name("float64"), Dtype::Float64);
    }

    #[test]
    fn test_full_compliance_requires_every_column() {
        let observed: BTreeMap<String, Dtype> = EXPECTED_SCHEMA
            .iter()
            .map(|(col, dtype)| (col.to_string(), *dtype))
            .collect();
        let report = compliance_report(&observed);
        assert_eq!(report.overall_compliance, 100.0);

        let mut missing_one = observed.clone();
        missing_one.remove("wind_speed");
        let report = compliance_report(&missing_one);
        assert!(report.overall_compliance < 100.0);
        assert_eq!(report.compliance_report["wind_speed"], 0.0);
    }

    #[test]
    fn test_dtype_mismatch_scores_zero_for_column() {
        let mut observed: BTreeMap<String, Dtype> = EXPECTED_SCHEMA
            .iter()
            .map(|(col, dtype)| (col.to_string(), *dtype))
            .collect();
        observed.insert("humidity".to_string(), Dtype::Float64);

        let report = compliance_report(&observed);
        assert_eq!(report.compliance_report["humidity"], 0.0);
        assert_eq!(report.compliance_report["temperature"], 100.0);
    }
}
