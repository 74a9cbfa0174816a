use chrono::{DateTime, Duration, Utc};

use crate::domain::weather::{ForecastBundle, Location, haversine_m};

/// A fetched forecast stays usable this long.
pub const FORECAST_EXPIRY: Duration = Duration::hours(3);
/// A fetched forecast stays usable while the viewer is within this radius.
pub const FORECAST_DISTANCE_LIMIT_M: f64 = 3_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessState {
    Fresh,
    Stale,
    Offline,
}

#[must_use]
pub fn evaluate_freshness(
    last_success: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    now: DateTime<Utc>,
) -> FreshnessState {
    let Some(last_success) = last_success else {
        return if consecutive_failures >= 3 {
            FreshnessState::Offline
        } else {
            FreshnessState::Stale
        };
    };

    let age = now - last_success;
    if age > FORECAST_EXPIRY * 2 || consecutive_failures >= 3 {
        FreshnessState::Offline
    } else if age > FORECAST_EXPIRY || consecutive_failures >= 1 {
        FreshnessState::Stale
    } else {
        FreshnessState::Fresh
    }
}

/// Whether `cached` can still be shown for `location` instead of fetching.
#[must_use]
pub fn can_reuse(cached: &ForecastBundle, location: &Location, now: DateTime<Utc>) -> bool {
    if now - cached.fetched_at > FORECAST_EXPIRY {
        return false;
    }
    let moved = haversine_m(
        cached.location.latitude,
        cached.location.longitude,
        location.latitude,
        location.longitude,
    );
    moved <= FORECAST_DISTANCE_LIMIT_M
}
