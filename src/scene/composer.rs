use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use super::{
    assets::{AssetCache, Model},
    catalog::{self, DisplayScale, Rgba, StagePlacement},
    clouds::CloudField,
    error::SceneError,
    graph::{CameraPose, NodeContent, NodeId, SceneGraph, Transform},
    precipitation::PrecipitationField,
    tuning::StageTuning,
};
use crate::domain::weather::{Condition, WeatherSnapshot};

/// Snapshot of what is on stage, for logs and `--one-shot` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub terrain: Option<&'static str>,
    pub scale: DisplayScale,
    pub ticking: bool,
    pub forecast: Option<WeatherSnapshot>,
    pub stage_position: Option<Vec3>,
    pub stage_scale: Option<f32>,
    pub scene_nodes: usize,
    pub sky_color: Option<Rgba>,
    pub clouds_active: usize,
    pub clouds_visible: usize,
    pub cloud_velocity: f32,
    pub precipitation_units: usize,
    pub precipitation_rate: Option<f64>,
    pub columns_per_unit: usize,
}

/// Owns the scene root and everything under it. Weather updates rebuild the
/// stage; frame ticks advance the live clouds and curtains in place.
#[derive(Debug)]
pub struct SceneComposer<R = StdRng> {
    graph: SceneGraph,
    assets: AssetCache,
    rng: R,
    tuning: StageTuning,
    terrain_index: Option<usize>,
    clouds: Option<CloudField>,
    precipitation: Option<PrecipitationField>,
    root: Option<NodeId>,
    forecast: Option<WeatherSnapshot>,
    scale: DisplayScale,
    pose: CameraPose,
    placement: Option<StagePlacement>,
    sky: Option<Rgba>,
    ticking: bool,
}

impl SceneComposer<StdRng> {
    /// Builtin models and an entropy or fixed seed.
    pub fn seeded(tuning: StageTuning, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(AssetCache::default(), tuning, rng)
    }
}

impl<R: Rng> SceneComposer<R> {
    pub fn new(assets: AssetCache, tuning: StageTuning, rng: R) -> Self {
        Self {
            graph: SceneGraph::new(),
            assets,
            rng,
            tuning,
            terrain_index: None,
            clouds: None,
            precipitation: None,
            root: None,
            forecast: None,
            scale: DisplayScale::default(),
            pose: CameraPose::default(),
            placement: None,
            sky: None,
            ticking: false,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn clouds(&self) -> Option<&CloudField> {
        self.clouds.as_ref()
    }

    pub fn precipitation(&self) -> Option<&PrecipitationField> {
        self.precipitation.as_ref()
    }

    pub fn terrain_index(&self) -> Option<usize> {
        self.terrain_index
    }

    pub fn forecast(&self) -> Option<&WeatherSnapshot> {
        self.forecast.as_ref()
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn tuning(&self) -> &StageTuning {
        &self.tuning
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.pose
    }

    /// Takes effect on the next rebuild; a live stage stays where it was
    /// anchored.
    pub fn set_camera_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    /// Nodes owned by the current root, root included.
    pub fn scene_node_count(&self) -> usize {
        self.root.map_or(0, |root| self.graph.subtree_len(root))
    }

    /// Selects a terrain and lays out its cloud grid. A forecast received
    /// earlier is rebuilt onto the new terrain straight away.
    pub fn setup(&mut self, terrain_index: usize) -> Result<(), SceneError> {
        let terrain = catalog::terrain(terrain_index)?;
        self.clouds = Some(CloudField::new(terrain, &self.tuning, &mut self.rng));
        self.precipitation = Some(PrecipitationField::new(terrain, &self.tuning));
        self.terrain_index = Some(terrain_index);
        log::info!("terrain `{}` selected", terrain.id);

        if self.forecast.is_some() {
            self.rebuild()
        } else {
            self.discard_root()
        }
    }

    /// Replaces the stage for a new observation or display size.
    pub fn update(&mut self, forecast: WeatherSnapshot, scale: DisplayScale) -> Result<(), SceneError> {
        self.forecast = Some(forecast.sanitized());
        self.scale = scale;
        if self.terrain_index.is_none() {
            log::debug!("forecast stored; no terrain selected yet");
            return Ok(());
        }
        self.rebuild()
    }

    pub fn start(&mut self) {
        self.ticking = true;
    }

    pub fn stop(&mut self) {
        self.ticking = false;
    }

    /// Advances clouds and curtains by `dt` seconds. Does nothing while
    /// stopped or before the first stage is built.
    pub fn advance_frame(&mut self, dt: f64) {
        if !self.ticking || self.root.is_none() {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if let Some(clouds) = self.clouds.as_mut() {
            clouds.advance(dt, &mut self.graph);
        }
        if let Some(precipitation) = self.precipitation.as_mut() {
            precipitation.advance(dt, &mut self.graph, &mut self.rng);
        }
    }

    pub fn summary(&self) -> SceneSummary {
        let clouds = self.clouds.as_ref();
        let precipitation = self.precipitation.as_ref();
        let sizing = precipitation.and_then(PrecipitationField::sizing);
        let stage_position = self
            .root
            .and_then(|root| self.graph.get(root))
            .map(|node| node.transform.translation);
        SceneSummary {
            terrain: self
                .terrain_index
                .and_then(|index| catalog::terrain(index).ok())
                .map(|terrain| terrain.id),
            scale: self.scale,
            ticking: self.ticking,
            forecast: self.forecast,
            stage_position,
            stage_scale: self.placement.map(|p| p.scale),
            scene_nodes: self.scene_node_count(),
            sky_color: self.sky,
            clouds_active: clouds.map_or(0, |c| c.instances().len()),
            clouds_visible: clouds.map_or(0, CloudField::visible_count),
            cloud_velocity: clouds.map_or(0.0, CloudField::velocity),
            precipitation_units: precipitation.map_or(0, |p| p.units().len()),
            precipitation_rate: sizing.map(|s| s.rate),
            columns_per_unit: sizing.map_or(0, |s| s.instance_count),
        }
    }

    fn rebuild(&mut self) -> Result<(), SceneError> {
        let (Some(terrain_index), Some(forecast)) = (self.terrain_index, self.forecast) else {
            return Ok(());
        };

        let root = self.graph.spawn(NodeContent::Group);
        let placement = match self.build_stage(root, terrain_index, &forecast) {
            Ok(placement) => placement,
            Err(err) => {
                self.graph.remove(root)?;
                self.clear_stage()?;
                return Err(err);
            }
        };

        self.discard_root()?;
        self.graph.attach(root, self.graph.anchor())?;
        self.root = Some(root);
        self.placement = Some(placement);
        log::debug!(
            "stage rebuilt on terrain {terrain_index} at {:?}: {} nodes",
            self.scale,
            self.graph.subtree_len(root)
        );
        Ok(())
    }

    /// Fills a detached root; the live root stays attached until it is swapped.
    fn build_stage(
        &mut self,
        root: NodeId,
        terrain_index: usize,
        forecast: &WeatherSnapshot,
    ) -> Result<StagePlacement, SceneError> {
        let placement = catalog::stage_placement(terrain_index, self.scale)?;
        let terrain = catalog::terrain(terrain_index)?;
        let daylight = forecast.is_daylight;
        let condition = forecast.condition;
        self.graph.set_local_transform(
            root,
            Transform {
                translation: self.pose.project(self.tuning.camera_forward_offset) + placement.offset,
                scale: Vec3::splat(placement.scale),
                ..Transform::default()
            },
        )?;

        self.sky = None;
        if let Some(mut base) = self.load_model(catalog::BASE_MODEL) {
            let sky = catalog::sky_color(daylight, condition);
            match base.set_slot_color(catalog::SKY_DOME_SLOT, sky) {
                Ok(()) => self.sky = Some(sky),
                Err(err) => log::warn!("sky dome left untinted: {err}"),
            }
            self.graph
                .spawn_child(root, NodeContent::Model(base), Transform::default())?;
        }

        if let Some(mut ground) = self.load_model(terrain.model) {
            let tints = catalog::terrain_tints(terrain_index, daylight, condition)?;
            if let Err(err) = ground.apply_tints(tints) {
                log::warn!("terrain tints partially applied: {err}");
            }
            self.graph
                .spawn_child(root, NodeContent::Model(ground), Transform::default())?;
        }

        self.populate_clouds(root, forecast)?;
        self.populate_precipitation(root, forecast, daylight, condition)?;
        Ok(placement)
    }

    fn populate_clouds(&mut self, root: NodeId, forecast: &WeatherSnapshot) -> Result<(), SceneError> {
        let cloud = self.load_model(catalog::CLOUD_MODEL).map(|mut cloud| {
            let tint = catalog::cloud_color(forecast.is_daylight, forecast.condition);
            if let Err(err) = cloud.set_slot_color(0, tint) {
                log::warn!("cloud left untinted: {err}");
            }
            cloud
        });
        let Some(clouds) = self.clouds.as_mut() else {
            return Ok(());
        };
        match cloud {
            Some(cloud) => clouds.populate(&mut self.graph, root, forecast, &cloud, &mut self.rng),
            None => {
                clouds.reset();
                Ok(())
            }
        }
    }

    fn populate_precipitation(
        &mut self,
        root: NodeId,
        forecast: &WeatherSnapshot,
        daylight: bool,
        condition: Condition,
    ) -> Result<(), SceneError> {
        let Some(precipitation) = self.precipitation.as_mut() else {
            return Ok(());
        };
        let color = catalog::precipitation_color(daylight, condition);
        precipitation.populate(&mut self.graph, root, forecast, color, &mut self.rng)?;
        Ok(())
    }

    fn load_model(&mut self, name: &str) -> Option<Model> {
        match self.assets.load_named_model(name) {
            Ok(model) => Some(model),
            Err(err) => {
                log::warn!("omitting `{name}` from the stage: {err}");
                None
            }
        }
    }

    /// Drops the live stage along with the field tracking that points into it.
    fn clear_stage(&mut self) -> Result<(), SceneError> {
        if let Some(clouds) = self.clouds.as_mut() {
            clouds.reset();
        }
        if let Some(precipitation) = self.precipitation.as_mut() {
            precipitation.reset();
        }
        self.sky = None;
        self.discard_root()
    }

    fn discard_root(&mut self) -> Result<(), SceneError> {
        self.placement = None;
        if let Some(old) = self.root.take() {
            let freed = self.graph.remove(old)?;
            log::debug!("previous stage discarded ({freed} nodes)");
        }
        Ok(())
    }
}
