use glam::{Quat, Vec3};
use rand::Rng;

use super::{
    assets::Material,
    catalog::{Rgba, TerrainSpec},
    error::SceneError,
    graph::{NodeContent, NodeId, SceneGraph, Transform},
    mesh::{CurtainParams, build_curtain_mesh},
    tuning::{FALL_SPEED_JITTER, GROUND_THRESHOLD, RAIN_TILT, RAIN_UNIT_COUNT, StageTuning},
};
use crate::domain::weather::{Condition, WeatherSnapshot, radians_from_degrees};

/// Density and speed derived from an hour's precipitation amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipitationSizing {
    /// Amount over the configured maximum, 0.0 ..= 1.0.
    pub rate: f64,
    /// Columns per curtain.
    pub instance_count: usize,
    /// m/s, between one and two times the configured base speed.
    pub base_speed: f64,
}

/// Returns `None` when nothing should fall.
pub fn sizing(amount_mm: f64, tuning: &StageTuning) -> Option<PrecipitationSizing> {
    if amount_mm.is_nan() || amount_mm <= 0.0 {
        return None;
    }
    let rate = amount_mm.min(tuning.precipitation_max_mm) / tuning.precipitation_max_mm;
    let instance_count = (tuning.max_instances_per_unit * rate).round() as usize;
    if instance_count == 0 {
        return None;
    }
    Some(PrecipitationSizing {
        rate,
        instance_count,
        base_speed: tuning.base_fall_speed * rate + tuning.base_fall_speed,
    })
}

/// One stacked curtain and its own fall speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipitationUnit {
    pub node: NodeId,
    pub position: Vec3,
    pub speed: f64,
}

#[derive(Debug)]
pub struct PrecipitationField {
    terrain: TerrainSpec,
    tuning: StageTuning,
    units: Vec<PrecipitationUnit>,
    base: Option<NodeId>,
    sizing: Option<PrecipitationSizing>,
    curtain_height: f32,
}

impl PrecipitationField {
    pub fn new(terrain: &TerrainSpec, tuning: &StageTuning) -> Self {
        Self {
            terrain: *terrain,
            tuning: *tuning,
            units: Vec::new(),
            base: None,
            sizing: None,
            curtain_height: 0.0,
        }
    }

    pub fn units(&self) -> &[PrecipitationUnit] {
        &self.units
    }

    pub fn sizing(&self) -> Option<PrecipitationSizing> {
        self.sizing
    }

    pub fn base_node(&self) -> Option<NodeId> {
        self.base
    }

    /// Column height of the curtains currently on stage.
    pub fn curtain_height(&self) -> f32 {
        self.curtain_height
    }

    /// Where a unit restarts after reaching the ground.
    pub fn respawn_height(&self) -> f32 {
        self.terrain.cloud_layer.y + GROUND_THRESHOLD
    }

    /// Builds the stacked curtains for `forecast` under `parent`. Returns the
    /// number of units placed; zero when the hour is dry.
    pub fn populate<R: Rng>(
        &mut self,
        graph: &mut SceneGraph,
        parent: NodeId,
        forecast: &WeatherSnapshot,
        color: Rgba,
        rng: &mut R,
    ) -> Result<usize, SceneError> {
        self.reset();
        let Some(sizing) = sizing(forecast.precipitation_mm, &self.tuning) else {
            log::debug!("no precipitation for {:.2} mm", forecast.precipitation_mm);
            return Ok(0);
        };

        let height = match forecast.condition {
            Condition::Snow => self.tuning.snow_height,
            Condition::Clear | Condition::Rain => self.tuning.rain_height,
        };
        let params = CurtainParams {
            count: sizing.instance_count,
            width: self.tuning.curtain_width,
            height,
            stage_radius: self.terrain.stage_radius,
            y_band: (-(self.tuning.unit_height - self.tuning.rain_height), 0.0),
        };
        let material = Material { unlit: true, color };

        let base = graph.spawn_child(
            parent,
            NodeContent::Group,
            Transform::from_rotation(field_orientation(
                forecast.wind_speed_kph,
                forecast.wind_direction_deg,
                self.tuning.tilt_wind_speed_kph,
            )),
        )?;

        for index in 0..RAIN_UNIT_COUNT {
            let Some(mesh) = build_curtain_mesh(&params, rng) else {
                continue;
            };
            let position = self.terrain.cloud_layer
                - Vec3::new(0.0, self.tuning.unit_height * (index as f32 + 0.5), 0.0);
            let node = graph.spawn_child(
                base,
                NodeContent::Curtain { mesh, material },
                Transform::from_translation(position),
            )?;
            self.units.push(PrecipitationUnit {
                node,
                position,
                speed: sizing.base_speed,
            });
        }

        self.base = Some(base);
        self.sizing = Some(sizing);
        self.curtain_height = height;
        log::debug!(
            "precipitation populated: {} units x {} columns, rate {:.2}",
            self.units.len(),
            sizing.instance_count,
            sizing.rate
        );
        Ok(self.units.len())
    }

    /// Drops every unit by its own speed, recycling the ones that reached
    /// the ground with a freshly drawn speed.
    pub fn advance<R: Rng>(&mut self, dt: f64, graph: &mut SceneGraph, rng: &mut R) {
        let Some(sizing) = self.sizing else {
            return;
        };
        let respawn = self.respawn_height();
        for unit in &mut self.units {
            unit.position.y -= (unit.speed * dt) as f32;
            if unit.position.y < GROUND_THRESHOLD {
                unit.position.y = respawn;
                unit.speed = sizing.base_speed * rng.random_range(FALL_SPEED_JITTER);
            }
            if let Some(node) = graph.get_mut(unit.node) {
                node.transform.translation = unit.position;
            }
        }
    }

    pub fn reset(&mut self) {
        self.units.clear();
        self.base = None;
        self.sizing = None;
        self.curtain_height = 0.0;
    }
}

/// Heading against the wind, plus a fixed streak tilt once the wind is
/// strong enough.
pub fn field_orientation(wind_speed_kph: f64, wind_direction_deg: f64, tilt_threshold_kph: f64) -> Quat {
    let heading = Quat::from_rotation_y(-radians_from_degrees(wind_direction_deg) as f32);
    let tilt = if wind_speed_kph > tilt_threshold_kph {
        RAIN_TILT
    } else {
        0.0
    };
    heading * Quat::from_rotation_x(-tilt)
}
