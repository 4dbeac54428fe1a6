//! Trait and types for a current-weather provider.

use anyhow::Result;

/// A geographic point to sample, keyed by the province name the student's
/// dataset reports it under.
#[derive(Debug, Clone)]
pub struct Location {
    pub province: String,
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions at one location, as returned by the provider.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Resolved place name (may differ from the requested province).
    pub location: String,
    pub weather_main: String,
    pub weather_description: String,
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: i64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
}

/// Abstraction over a current-weather provider (e.g. OpenWeatherMap).
#[async_trait::async_trait]
pub trait WeatherApi {
    /// Fetches the current conditions at `location`.
    async fn current_weather(&self, location: &Location) -> Result<Observation>;
}
