use anyhow::{Result, anyhow};
use async_trait::async_trait;

use weather_grader::fetch::auth::UrlParam;
use weather_grader::fetch::{BasicClient, fetch_json};
use weather_grader::services::weather_api::{Location, Observation, WeatherApi};

/// Current-weather client for the OpenWeatherMap API.
///
/// The API key rides along as the `appid` query parameter on every
/// request; responses are parsed as generic JSON to extract only the
/// fields the record schema needs.
pub struct OpenWeatherClient {
    base_url: String,
    http: UrlParam<BasicClient>,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            http: UrlParam {
                inner: BasicClient::with_timeouts()?,
                param_name: "appid".to_string(),
                key: api_key,
            },
        })
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_weather(&self, location: &Location) -> Result<Observation> {
        let url = format!(
            "{}/weather?lat={}&lon={}&units=metric",
            self.base_url, location.lat, location.lon
        );

        let json = fetch_json(&self.http, &url).await?;

        let temperature = json["main"]["temp"]
            .as_f64()
            .ok_or_else(|| anyhow!("response missing main.temp for {}", location.province))?;
        let humidity = json["main"]["humidity"]
            .as_i64()
            .ok_or_else(|| anyhow!("response missing main.humidity for {}", location.province))?;
        let wind_speed = json["wind"]["speed"]
            .as_f64()
            .ok_or_else(|| anyhow!("response missing wind.speed for {}", location.province))?;

        Ok(Observation {
            location: json["name"].as_str().unwrap_or("").to_string(),
            weather_main: json["weather"][0]["main"].as_str().unwrap_or("").to_string(),
            weather_description: json["weather"][0]["description"]
                .as_str()
                .unwrap_or("")
                .to_string(),
            temperature,
            humidity,
            wind_speed,
        })
    }
}
