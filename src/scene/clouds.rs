use glam::{Quat, Vec3};
use rand::{Rng, seq::SliceRandom};

use super::{
    assets::Model,
    catalog::TerrainSpec,
    error::SceneError,
    graph::{NodeContent, NodeId, SceneGraph, Transform},
    tuning::{CLOUD_JITTER_XZ, CLOUD_JITTER_Y, StageTuning},
};
use crate::domain::weather::{WeatherSnapshot, kph_to_mps, radians_from_degrees};

/// Grid cell a cloud can occupy, relative to the cloud layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudSlot {
    pub offset: Vec3,
}

/// A slot promoted to a live node for the current forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudInstance {
    pub node: NodeId,
    pub position: Vec3,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudPhase {
    GridBuilt,
    Populated,
}

#[derive(Debug)]
pub struct CloudField {
    terrain: TerrainSpec,
    tuning: StageTuning,
    slots: Vec<CloudSlot>,
    instances: Vec<CloudInstance>,
    base: Option<NodeId>,
    velocity: f32,
    phase: CloudPhase,
}

impl CloudField {
    /// Lays out the terrain's slot grid once; it is reused by every
    /// forecast until the terrain changes.
    pub fn new<R: Rng>(terrain: &TerrainSpec, tuning: &StageTuning, rng: &mut R) -> Self {
        Self {
            terrain: *terrain,
            tuning: *tuning,
            slots: build_grid(terrain, tuning.cloud_size, rng),
            instances: Vec::new(),
            base: None,
            velocity: 0.0,
            phase: CloudPhase::GridBuilt,
        }
    }

    pub fn slots(&self) -> &[CloudSlot] {
        &self.slots
    }

    pub fn instances(&self) -> &[CloudInstance] {
        &self.instances
    }

    pub fn phase(&self) -> CloudPhase {
        self.phase
    }

    pub fn base_node(&self) -> Option<NodeId> {
        self.base
    }

    pub fn visible_count(&self) -> usize {
        self.instances.iter().filter(|c| c.visible).count()
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Shuffled pick of the slots that carry a cloud for `cover`.
    pub fn select_active<R: Rng>(&self, cover: f64, rng: &mut R) -> Vec<CloudSlot> {
        let count = active_count(self.slots.len(), cover);
        let mut slots = self.slots.clone();
        slots.shuffle(rng);
        slots.truncate(count);
        slots
    }

    /// Spawns one cloud node per active slot under a wind-aligned base node
    /// parented to `parent`. Tracking from a previous forecast is dropped;
    /// the caller owns removal of the old nodes.
    pub fn populate<R: Rng>(
        &mut self,
        graph: &mut SceneGraph,
        parent: NodeId,
        forecast: &WeatherSnapshot,
        cloud: &Model,
        rng: &mut R,
    ) -> Result<(), SceneError> {
        self.reset();
        self.velocity = stage_velocity(forecast.wind_speed_kph, &self.tuning);

        let active = self.select_active(forecast.cloud_cover, rng);
        let base = graph.spawn_child(
            parent,
            NodeContent::Group,
            Transform::from_rotation(field_rotation(forecast.wind_direction_deg)),
        )?;
        let radius_sq = self.terrain.squared_stage_radius();
        for slot in active {
            let position = slot.offset + self.terrain.cloud_layer;
            let visible = within_stage(position, radius_sq);
            let node = graph.spawn_child(
                base,
                NodeContent::Model(cloud.clone()),
                Transform::from_translation(position),
            )?;
            graph.set_visible(node, visible)?;
            self.instances.push(CloudInstance {
                node,
                position,
                visible,
            });
        }

        self.base = Some(base);
        self.phase = CloudPhase::Populated;
        log::debug!(
            "cloud field populated: {} of {} slots, velocity {:.5} m/s",
            self.instances.len(),
            self.slots.len(),
            self.velocity
        );
        Ok(())
    }

    /// Drifts every cloud along the field's local +x.
    pub fn advance(&mut self, dt: f64, graph: &mut SceneGraph) {
        if self.phase != CloudPhase::Populated {
            return;
        }
        let step = self.velocity * dt as f32;
        let threshold = fold_threshold(self.terrain.grid_columns(), self.tuning.cloud_size.x);
        let radius_sq = self.terrain.squared_stage_radius();

        for cloud in &mut self.instances {
            cloud.position.x = fold_back(cloud.position.x + step, threshold);
            cloud.visible = within_stage(cloud.position, radius_sq);
            if let Some(node) = graph.get_mut(cloud.node) {
                node.transform.translation = cloud.position;
                node.visible = cloud.visible;
            }
        }
    }

    /// Forgets the tracked clouds, keeping the grid.
    pub fn reset(&mut self) {
        self.instances.clear();
        self.base = None;
        self.velocity = 0.0;
        self.phase = CloudPhase::GridBuilt;
    }
}

fn build_grid<R: Rng>(terrain: &TerrainSpec, cloud_size: Vec3, rng: &mut R) -> Vec<CloudSlot> {
    let columns = terrain.grid_columns();
    let rows = terrain.grid_rows();
    let (width, depth) = (cloud_size.x, cloud_size.z);
    let x_start = (columns / 2) as f32 * width;
    let z_start = (rows / 2) as f32 * depth;

    let mut slots = Vec::with_capacity(columns * rows);
    for xi in 0..columns {
        for zi in 0..rows {
            let x = xi as f32 * width - x_start + rng.random_range(-CLOUD_JITTER_XZ..=CLOUD_JITTER_XZ);
            let y = rng.random_range(CLOUD_JITTER_Y);
            let z = zi as f32 * depth - z_start + rng.random_range(-CLOUD_JITTER_XZ..=CLOUD_JITTER_XZ);
            slots.push(CloudSlot {
                offset: Vec3::new(x, y, z),
            });
        }
    }
    slots
}

/// Clouds carried for `cover`, rounding half up. Non-positive cover
/// yields none; cover above one fills every slot.
pub fn active_count(slots: usize, cover: f64) -> usize {
    if cover.is_nan() || cover <= 0.0 {
        return 0;
    }
    ((slots as f64 * cover).round() as usize).min(slots)
}

/// Stage-space drift speed for an observed wind, capped and slowed down.
pub fn stage_velocity(wind_speed_kph: f64, tuning: &StageTuning) -> f32 {
    let capped = wind_speed_kph.max(0.0).min(tuning.wind_speed_max_kph);
    (kph_to_mps(capped) / tuning.wind_stage_coefficient) as f32
}

/// Past this x a cloud is mirrored to the far edge.
pub fn fold_threshold(columns: usize, cloud_width: f32) -> f32 {
    cloud_width * (columns / 2) as f32 + cloud_width / 2.0
}

pub fn fold_back(x: f32, threshold: f32) -> f32 {
    if x > threshold { -x } else { x }
}

/// Inclusive radial test against the squared stage radius.
pub fn within_stage(position: Vec3, radius_sq: f32) -> bool {
    position.length_squared() <= radius_sq
}

/// Turns the field so the prevailing wind blows along local +x.
pub fn field_rotation(wind_direction_deg: f64) -> Quat {
    Quat::from_rotation_y(radians_from_degrees(-90.0 - wind_direction_deg) as f32)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::scene::catalog::{TERRAINS, terrain};

    fn field(seed: u64) -> (CloudField, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = CloudField::new(&TERRAINS[0], &StageTuning::default(), &mut rng);
        (field, rng)
    }

    fn snapshot(cover: f64, wind: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            cloud_cover: cover,
            wind_speed_kph: wind,
            ..WeatherSnapshot::default()
        }
    }

    #[test]
    fn grid_is_centered_and_jittered_within_bounds() {
        let (field, _) = field(7);
        assert_eq!(field.slots().len(), 35);
        assert_eq!(field.phase(), CloudPhase::GridBuilt);
        for slot in field.slots() {
            assert!((-0.17..=0.17).contains(&slot.offset.x), "x {}", slot.offset.x);
            assert!((-0.13..=0.13).contains(&slot.offset.z), "z {}", slot.offset.z);
            assert!((-0.01..=0.02).contains(&slot.offset.y));
        }
        let first = field.slots()[0].offset;
        assert!((first.x + 0.16).abs() <= 0.0101);
        assert!((first.z + 0.12).abs() <= 0.0101);
    }

    #[test]
    fn active_count_rounds_half_up() {
        assert_eq!(active_count(35, 0.5), 18);
        assert_eq!(active_count(35, 0.0), 0);
        assert_eq!(active_count(35, -0.3), 0);
        assert_eq!(active_count(35, 1.0), 35);
        assert_eq!(active_count(35, 1.4), 35);
        assert_eq!(active_count(35, f64::NAN), 0);
    }

    #[test]
    fn velocity_is_capped_and_zero_without_wind() {
        let tuning = StageTuning::default();
        assert_eq!(stage_velocity(0.0, &tuning), 0.0);
        assert_eq!(stage_velocity(150.0, &tuning), stage_velocity(100.0, &tuning));
        assert!(stage_velocity(20.0, &tuning) < stage_velocity(40.0, &tuning));
        assert!((stage_velocity(36.0, &tuning) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fold_back_mirrors_past_threshold() {
        let threshold = fold_threshold(5, 0.08);
        assert!((threshold - 0.2).abs() < 1e-6);
        assert_eq!(fold_back(0.21, threshold), -0.21);
        assert_eq!(fold_back(0.19, threshold), 0.19);
        assert_eq!(fold_back(-0.5, threshold), -0.5);
    }

    #[test]
    fn stage_boundary_is_inclusive() {
        assert!(within_stage(Vec3::new(0.15, 0.0, 0.0), 0.15 * 0.15));
        assert!(!within_stage(Vec3::new(0.15, 0.001, 0.0), 0.15 * 0.15));
    }

    #[test]
    fn populate_spawns_selected_clouds_under_rotated_base() {
        let (mut field, mut rng) = field(11);
        let mut graph = SceneGraph::new();
        let parent = graph.anchor();
        let model = Model::with_slots("cloud", 1);

        field
            .populate(&mut graph, parent, &snapshot(0.5, 20.0), &model, &mut rng)
            .expect("populate");

        assert_eq!(field.phase(), CloudPhase::Populated);
        assert_eq!(field.instances().len(), 18);
        let base = field.base_node().expect("base");
        assert_eq!(graph.subtree_len(base), 19);
        let layer_y = terrain(0).expect("field").cloud_layer.y;
        for cloud in field.instances() {
            assert!(cloud.position.y >= layer_y - 0.0101);
        }
    }

    #[test]
    fn zero_cover_populates_an_empty_base() {
        let (mut field, mut rng) = field(12);
        let mut graph = SceneGraph::new();
        let model = Model::with_slots("cloud", 1);
        let anchor = graph.anchor();
        field
            .populate(&mut graph, anchor, &snapshot(0.0, 20.0), &model, &mut rng)
            .expect("populate");
        assert!(field.instances().is_empty());
    }

    #[test]
    fn advance_drifts_and_mirrors_clouds() {
        let (mut field, mut rng) = field(13);
        let mut graph = SceneGraph::new();
        let model = Model::with_slots("cloud", 1);
        let anchor = graph.anchor();
        field
            .populate(&mut graph, anchor, &snapshot(1.0, 36.0), &model, &mut rng)
            .expect("populate");

        let before: Vec<f32> = field.instances().iter().map(|c| c.position.x).collect();
        field.advance(0.1, &mut graph);
        let threshold = fold_threshold(5, 0.08);
        for (cloud, x0) in field.instances().iter().zip(before) {
            let moved = x0 + 0.01;
            let expected = if moved > threshold { -moved } else { moved };
            assert!((cloud.position.x - expected).abs() < 1e-5);
            let node = graph.get(cloud.node).expect("node");
            assert_eq!(node.transform.translation, cloud.position);
            assert_eq!(node.visible, cloud.visible);
        }
    }

    #[test]
    fn advancing_for_long_never_escapes_the_fold() {
        let (mut field, mut rng) = field(14);
        let mut graph = SceneGraph::new();
        let model = Model::with_slots("cloud", 1);
        let anchor = graph.anchor();
        field
            .populate(&mut graph, anchor, &snapshot(1.0, 100.0), &model, &mut rng)
            .expect("populate");
        let threshold = fold_threshold(5, 0.08);
        let step = stage_velocity(100.0, &StageTuning::default());
        for _ in 0..10_000 {
            field.advance(1.0 / 30.0, &mut graph);
        }
        for cloud in field.instances() {
            assert!(cloud.position.x <= threshold + step);
        }
    }

    #[test]
    fn advance_before_populate_is_a_no_op() {
        let (mut field, _) = field(15);
        let mut graph = SceneGraph::new();
        field.advance(1.0, &mut graph);
        assert!(field.instances().is_empty());
    }

    #[test]
    fn rotation_turns_east_wind_onto_plus_x() {
        let rotation = field_rotation(90.0);
        let axis = rotation * Vec3::X;
        assert!((axis - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        let north = field_rotation(0.0) * Vec3::X;
        assert!((north - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }
}
