//! Hand-picked hours that sweep the scene's input ranges: cover from 0.1 to
//! 1.0, calm to storm-force wind, every compass quadrant, and precipitation
//! from a trace up to well past the clamp.

use chrono::{NaiveDate, NaiveDateTime};

use super::{Condition, ForecastBundle, HourlyForecast, Location, WeatherSnapshot};

const fn sample(
    is_daylight: bool,
    condition: Condition,
    cloud_cover: f64,
    precipitation_mm: f64,
    wind_speed_kph: f64,
    wind_direction_deg: f64,
) -> WeatherSnapshot {
    WeatherSnapshot {
        is_daylight,
        condition,
        cloud_cover,
        precipitation_mm,
        wind_speed_kph,
        wind_direction_deg,
    }
}

pub const SAMPLE_HOURS: [WeatherSnapshot; 8] = [
    sample(true, Condition::Clear, 0.1, 10.0, 0.0, 0.0),
    sample(true, Condition::Rain, 0.2, 20.0, 10.0, 45.0),
    sample(false, Condition::Clear, 0.3, 30.0, 30.0, 90.0),
    sample(false, Condition::Rain, 0.4, 40.0, 40.0, 135.0),
    sample(false, Condition::Clear, 0.5, 50.0, 50.0, 180.0),
    sample(false, Condition::Clear, 0.6, 100.0, 60.0, 225.0),
    sample(false, Condition::Clear, 0.7, 200.0, 100.0, 270.0),
    sample(false, Condition::Clear, 1.0, 1.23, 200.0, 315.0),
];

/// Hours between consecutive samples, matching the hourly strip spacing.
pub const SAMPLE_INTERVAL_HOURS: i64 = 3;

pub fn sample_location() -> Location {
    Location {
        name: "Yosemite Park".to_string(),
        latitude: 37.89092,
        longitude: -119.54016,
    }
}

/// The samples packaged as a forecast so demo mode runs through the same
/// path as fetched data.
pub fn sample_bundle() -> ForecastBundle {
    let start = NaiveDate::from_ymd_opt(2022, 7, 11)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or(NaiveDateTime::MIN);
    let hourly = SAMPLE_HOURS
        .iter()
        .enumerate()
        .map(|(idx, snapshot)| HourlyForecast {
            time: start + chrono::Duration::hours(idx as i64 * SAMPLE_INTERVAL_HOURS),
            snapshot: *snapshot,
        })
        .collect();

    ForecastBundle {
        location: sample_location(),
        hourly,
        fetched_at: chrono::Utc::now(),
    }
}
