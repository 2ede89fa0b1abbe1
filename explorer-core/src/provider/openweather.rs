use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Coordinate, WeatherSnapshot},
    provider::{WeatherProvider, http_client, truncate_body},
};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeather current-conditions client. The key travels as the `appid`
/// query parameter.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self { api_key, http: http_client(timeout)? })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_coords(&self, point: Coordinate) -> Result<WeatherSnapshot, LookupError> {
        debug!(lat = point.lat, lon = point.lon, "fetching current weather");

        let lat = point.lat.to_string();
        let lon = point.lon.to_string();

        let res = self
            .http
            .get(format!("{BASE_URL}/weather"))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                // Celsius must be requested explicitly.
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::upstream(format!("Failed to reach OpenWeather: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::upstream(format!("Failed to read OpenWeather response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(LookupError::upstream(format!(
                "OpenWeather request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream(format!("Failed to parse OpenWeather JSON: {e}")))?;

        Ok(snapshot_from_response(parsed))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn snapshot_from_response(parsed: OwCurrentResponse) -> WeatherSnapshot {
    let observed_at = DateTime::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

    let (description, icon_code) = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.icon))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

    WeatherSnapshot {
        temp_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        description,
        icon_code,
        observed_at,
    }
}
