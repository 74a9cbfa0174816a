use chrono::NaiveDateTime;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Kilometres per hour to metres per second.
#[must_use]
pub fn kph_to_mps(kph: f64) -> f64 {
    kph * 1_000.0 / 60.0 / 60.0
}

#[must_use]
pub fn radians_from_degrees(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Folds an angle into -360.0 ..= 360.0 degrees, keeping its sign.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees % 360.0;
    if folded == 0.0 && degrees.abs() >= 360.0 {
        360.0_f64.copysign(degrees)
    } else {
        folded
    }
}

/// Great-circle distance in metres.
#[must_use]
pub fn haversine_m(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();
    let h = (d_phi / 2.0).sin().powi(2) + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").ok()
}
