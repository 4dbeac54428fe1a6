use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::services::weather_api::Observation;

/// One weather observation row. Immutable once created; one per API call.
///
/// The calendar fields duplicate `timestamp` so the storage layer can
/// partition shards without re-parsing instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: DateTime<Utc>,
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    /// Capture instant rendered in the configured local offset.
    pub created_at: DateTime<FixedOffset>,
    pub requested_province: String,
    pub location: String,
    pub weather_main: String,
    pub weather_description: String,
    pub temperature: f64,
    pub humidity: i64,
    pub wind_speed: f64,
}

impl WeatherRecord {
    /// Builds a record from one observation captured at `captured_at`.
    pub fn from_observation(
        province: &str,
        obs: &Observation,
        captured_at: DateTime<Utc>,
        local: FixedOffset,
    ) -> Self {
        Self {
            timestamp: captured_at,
            year: i64::from(captured_at.year()),
            month: i64::from(captured_at.month()),
            day: i64::from(captured_at.day()),
            hour: i64::from(captured_at.hour()),
            minute: i64::from(captured_at.minute()),
            created_at: captured_at.with_timezone(&local),
            requested_province: province.to_string(),
            location: obs.location.clone(),
            weather_main: obs.weather_main.clone(),
            weather_description: obs.weather_description.clone(),
            temperature: obs.temperature,
            humidity: obs.humidity,
            wind_speed: obs.wind_speed,
        }
    }

    /// Hive-style partition directory for this record, relative to the
    /// dataset root (`year=Y/month=M/day=D/hour=H`).
    pub fn partition_dir(&self) -> String {
        format!(
            "year={}/month={}/day={}/hour={}",
            self.year, self.month, self.day, self.hour
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_observation() -> Observation {
        Observation {
            location: "Bangkok".to_string(),
            weather_main: "Clouds".to_string(),
            weather_description: "scattered clouds".to_string(),
            temperature: 31.4,
            humidity: 64,
            wind_speed: 3.2,
        }
    }

    #[test]
    fn test_calendar_fields_derive_from_utc_timestamp() {
        let captured = Utc.with_ymd_and_hms(2025, 5, 3, 17, 55, 12).unwrap();
        let local = FixedOffset::east_opt(7 * 3600).unwrap();
        let record =
            WeatherRecord::from_observation("Bangkok", &sample_observation(), captured, local);

        assert_eq!(record.year, 2025);
        assert_eq!(record.month, 5);
        assert_eq!(record.day, 3);
        assert_eq!(record.hour, 17);
        assert_eq!(record.minute, 55);
        // created_at is the same instant, shifted into the local offset
        assert_eq!(record.created_at, captured);
        assert_eq!(record.created_at.hour(), 0);
    }

    #[test]
    fn test_partition_dir_uses_unpadded_components() {
        let captured = Utc.with_ymd_and_hms(2025, 5, 3, 7, 0, 0).unwrap();
        let local = FixedOffset::east_opt(7 * 3600).unwrap();
        let record =
            WeatherRecord::from_observation("Phuket", &sample_observation(), captured, local);

        assert_eq!(record.partition_dir(), "year=2025/month=5/day=3/hour=7");
    }
}
