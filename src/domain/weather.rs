mod conversions;
pub mod samples;

pub use conversions::*;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resilience::freshness::FreshnessState;

/// Precipitation regime the diorama knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Clear,
    Rain,
    Snow,
}

impl Condition {
    #[must_use]
    pub fn is_clear(self) -> bool {
        self == Condition::Clear
    }

    /// Column offset into the per-terrain tint rows (clear, rain, snow).
    #[must_use]
    pub fn tint_offset(self) -> usize {
        match self {
            Condition::Clear => 0,
            Condition::Rain => 1,
            Condition::Snow => 2,
        }
    }
}

/// One hour of weather as the scene consumes it. Immutable once handed to
/// the composer; a new observation replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub is_daylight: bool,
    pub condition: Condition,
    /// Fraction of sky covered, 0.0 ..= 1.0.
    pub cloud_cover: f64,
    /// Millimetres for the hour.
    pub precipitation_mm: f64,
    /// Kilometres per hour.
    pub wind_speed_kph: f64,
    /// Compass degrees the wind comes from (0 = N, 90 = E, 180 = S, 270 = W).
    pub wind_direction_deg: f64,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            is_daylight: true,
            condition: Condition::Clear,
            cloud_cover: 0.0,
            precipitation_mm: 0.0,
            wind_speed_kph: 0.0,
            wind_direction_deg: 0.0,
        }
    }
}

impl WeatherSnapshot {
    /// Clamps out-of-range provider values into the domain the scene expects.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            cloud_cover: finite_or_zero(self.cloud_cover).clamp(0.0, 1.0),
            precipitation_mm: finite_or_zero(self.precipitation_mm).max(0.0),
            wind_speed_kph: finite_or_zero(self.wind_speed_kph).max(0.0),
            wind_direction_deg: normalize_degrees(finite_or_zero(self.wind_direction_deg)),
            ..self
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self {
            name: format!("{lat:.4}, {lon:.4}"),
            latitude: lat,
            longitude: lon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HourlyForecast {
    pub time: NaiveDateTime,
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone)]
pub struct ForecastBundle {
    pub location: Location,
    pub hourly: Vec<HourlyForecast>,
    pub fetched_at: DateTime<Utc>,
}

impl ForecastBundle {
    /// Snapshot `offset` hours into the forecast, saturating at the last hour.
    pub fn snapshot_at(&self, offset: usize) -> Option<WeatherSnapshot> {
        let last = self.hourly.len().checked_sub(1)?;
        self.hourly.get(offset.min(last)).map(|h| h.snapshot)
    }
}

/// Maps an Open-Meteo WMO weather code onto the three drawable regimes.
/// Hail and mixed precipitation render as snow; drizzle, sleet and
/// thunderstorms without hail render as rain.
pub fn weather_code_to_condition(code: u8) -> Condition {
    match code {
        51..=57 | 61..=67 | 80..=82 | 95 => Condition::Rain,
        71..=77 | 85 | 86 | 96 | 99 => Condition::Snow,
        _ => Condition::Clear,
    }
}

#[derive(Debug, Clone)]
pub struct RefreshMetadata {
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub state: FreshnessState,
    pub consecutive_failures: u32,
}

impl Default for RefreshMetadata {
    fn default() -> Self {
        Self {
            last_success: None,
            last_attempt: None,
            state: FreshnessState::Stale,
            consecutive_failures: 0,
        }
    }
}

impl RefreshMetadata {
    pub fn mark_success(&mut self, at: DateTime<Utc>) {
        self.last_attempt = Some(at);
        self.last_success = Some(at);
        self.consecutive_failures = 0;
        self.state = FreshnessState::Fresh;
    }

    pub fn mark_failure(&mut self) {
        self.last_attempt = Some(Utc::now());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}
