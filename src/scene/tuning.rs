use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::TuningError;

/// Precipitation curtains stacked under the cloud layer.
pub const RAIN_UNIT_COUNT: usize = 7;
/// Height above the terrain at which a falling curtain is recycled.
pub const GROUND_THRESHOLD: f32 = 0.015;
/// Curtains keep this far inside the stage rim.
pub const FALL_EDGE_MARGIN: f32 = 0.01;
/// Streak tilt applied once the wind passes the tilt threshold.
pub const RAIN_TILT: f32 = std::f32::consts::PI / 16.0;
/// Multiplier range for a curtain's speed each time it wraps.
pub const FALL_SPEED_JITTER: std::ops::RangeInclusive<f64> = 0.8..=1.2;
/// Horizontal jitter for a cloud slot, either side of its grid cell.
pub const CLOUD_JITTER_XZ: f32 = 0.01;
/// Vertical jitter band for a cloud slot.
pub const CLOUD_JITTER_Y: std::ops::RangeInclusive<f32> = -0.01..=0.02;

/// Knobs that shape the diorama. All lengths are stage metres before the
/// display scale is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTuning {
    /// Cloud footprint (width, height, depth); the grid is laid out on it.
    pub cloud_size: Vec3,
    pub wind_speed_max_kph: f64,
    /// Real wind speed divided by this gives stage speed.
    pub wind_stage_coefficient: f64,
    pub curtain_width: f32,
    pub rain_height: f32,
    pub snow_height: f32,
    pub unit_height: f32,
    pub max_instances_per_unit: f64,
    pub precipitation_max_mm: f64,
    /// Fall speed at the lightest rate, m/s; doubles at the heaviest.
    pub base_fall_speed: f64,
    pub tilt_wind_speed_kph: f64,
    /// Where the stage sits relative to the camera, in camera space.
    pub camera_forward_offset: Vec3,
}

impl Default for StageTuning {
    fn default() -> Self {
        Self {
            cloud_size: Vec3::new(0.08, 0.02, 0.04),
            wind_speed_max_kph: 100.0,
            wind_stage_coefficient: 100.0,
            curtain_width: 0.001,
            rain_height: 0.01,
            snow_height: 0.001,
            unit_height: 0.03,
            max_instances_per_unit: 80.0,
            precipitation_max_mm: 40.0,
            base_fall_speed: 0.07,
            tilt_wind_speed_kph: 10.0,
            camera_forward_offset: Vec3::new(0.0, 0.0, -0.3),
        }
    }
}

impl StageTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("wind_stage_coefficient", self.wind_stage_coefficient)?;
        positive("precipitation_max_mm", self.precipitation_max_mm)?;
        positive("cloud_size.x", f64::from(self.cloud_size.x))?;
        positive("cloud_size.z", f64::from(self.cloud_size.z))?;
        positive("unit_height", f64::from(self.unit_height))?;
        positive("curtain_width", f64::from(self.curtain_width))?;
        non_negative("wind_speed_max_kph", self.wind_speed_max_kph)?;
        non_negative("max_instances_per_unit", self.max_instances_per_unit)?;
        non_negative("base_fall_speed", self.base_fall_speed)?;
        non_negative("tilt_wind_speed_kph", self.tilt_wind_speed_kph)?;
        non_negative("rain_height", f64::from(self.rain_height))?;
        non_negative("snow_height", f64::from(self.snow_height))?;
        if self.rain_height > self.unit_height {
            return Err(TuningError::RainTallerThanUnit {
                rain_height: self.rain_height,
                unit_height: self.unit_height,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Negative { field, value })
    }
}
