use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::weather::{
    ForecastBundle, HourlyForecast, Location, WeatherSnapshot, parse_datetime,
    weather_code_to_condition,
};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_FIELDS: &str =
    "is_day,weather_code,cloud_cover,precipitation,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, location: Location) -> Result<ForecastBundle> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("wind_speed_unit", "kmh".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_hours", "48".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast request returned non-success status")?;

        let payload: ForecastResponse = response
            .json()
            .await
            .context("failed to parse forecast payload")?;

        let hourly = parse_hourly(&payload.hourly);
        anyhow::ensure!(!hourly.is_empty(), "forecast payload has no usable hours");
        log::debug!("fetched {} hourly entries for {}", hourly.len(), location.name);

        Ok(ForecastBundle {
            location,
            hourly,
            fetched_at: Utc::now(),
        })
    }
}

fn parse_hourly(hourly: &HourlyBlock) -> Vec<HourlyForecast> {
    let mut out = Vec::new();
    for idx in 0..hourly.time.len() {
        let Some(time) = parse_datetime(&hourly.time[idx]) else {
            continue;
        };

        let field = |values: &[Option<f64>]| values.get(idx).copied().flatten().unwrap_or(0.0);
        let code = hourly.weather_code.get(idx).copied().flatten().unwrap_or(0);
        let snapshot = WeatherSnapshot {
            is_daylight: hourly.is_day.get(idx).copied().flatten().unwrap_or(1) == 1,
            condition: weather_code_to_condition(code),
            cloud_cover: field(&hourly.cloud_cover) / 100.0,
            precipitation_mm: field(&hourly.precipitation),
            wind_speed_kph: field(&hourly.wind_speed_10m),
            wind_direction_deg: field(&hourly.wind_direction_10m),
        };

        out.push(HourlyForecast {
            time,
            snapshot: snapshot.sanitized(),
        });
    }
    out
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
}
