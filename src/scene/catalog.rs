//! Static stage data: terrain geometry, display presets and the colour
//! tables that grade the scene by daylight and condition.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::SceneError;
use crate::domain::weather::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Material override for one slot of a terrain model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTint {
    pub unlit: bool,
    pub color: Rgba,
}

const fn lit(r: f32, g: f32, b: f32) -> SurfaceTint {
    SurfaceTint {
        unlit: false,
        color: Rgba::rgb(r, g, b),
    }
}

const fn glow(r: f32, g: f32, b: f32) -> SurfaceTint {
    SurfaceTint {
        unlit: true,
        color: Rgba::rgb(r, g, b),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSpec {
    pub id: &'static str,
    /// Asset name of the terrain model.
    pub model: &'static str,
    pub stage_radius: f32,
    /// Offset of the cloud layer above the stage origin; only `y` is used
    /// by the shipped terrains.
    pub cloud_layer: Vec3,
    /// Cloud slots along x (columns) and z (rows).
    pub cloud_grid: (usize, usize),
}

impl TerrainSpec {
    pub fn squared_stage_radius(&self) -> f32 {
        debug_assert!(self.stage_radius > 0.0, "{} has a non-positive radius", self.id);
        let radius = self.stage_radius.max(f32::EPSILON);
        radius * radius
    }

    pub fn grid_columns(&self) -> usize {
        debug_assert!(self.cloud_grid.0 >= 1, "{} has no cloud columns", self.id);
        self.cloud_grid.0.max(1)
    }

    pub fn grid_rows(&self) -> usize {
        debug_assert!(self.cloud_grid.1 >= 1, "{} has no cloud rows", self.id);
        self.cloud_grid.1.max(1)
    }

    pub fn slot_count(&self) -> usize {
        self.grid_columns() * self.grid_rows()
    }
}

pub const BASE_MODEL: &str = "base";
pub const CLOUD_MODEL: &str = "cloud";
/// Material slot of the base model that holds the sky dome.
pub const SKY_DOME_SLOT: usize = 0;
/// Material slots the base model is authored with.
pub const BASE_MATERIAL_SLOTS: usize = 4;

pub const TERRAINS: [TerrainSpec; 3] = [
    TerrainSpec {
        id: "field",
        model: "field",
        stage_radius: 0.15,
        cloud_layer: Vec3::new(0.0, 0.1, 0.0),
        cloud_grid: (5, 7),
    },
    TerrainSpec {
        id: "village",
        model: "village",
        stage_radius: 0.12,
        cloud_layer: Vec3::new(0.0, 0.09, 0.0),
        cloud_grid: (3, 5),
    },
    TerrainSpec {
        id: "town",
        model: "town",
        stage_radius: 0.18,
        cloud_layer: Vec3::new(0.0, 0.12, 0.0),
        cloud_grid: (7, 9),
    },
];

pub fn terrain(index: usize) -> Result<&'static TerrainSpec, SceneError> {
    TERRAINS.get(index).ok_or(SceneError::UnknownTerrain(index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayScale {
    #[default]
    Small,
    Medium,
    Large,
}

impl DisplayScale {
    pub const ALL: [DisplayScale; 3] = [DisplayScale::Small, DisplayScale::Medium, DisplayScale::Large];

    pub fn index(self) -> usize {
        match self {
            DisplayScale::Small => 0,
            DisplayScale::Medium => 1,
            DisplayScale::Large => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagePlacement {
    pub offset: Vec3,
    pub scale: f32,
}

const fn place(y: f32, scale: f32) -> StagePlacement {
    StagePlacement {
        offset: Vec3::new(0.0, y, 0.0),
        scale,
    }
}

const STAGE_PLACEMENTS: [[StagePlacement; 3]; 3] = [
    [place(0.0, 0.4), place(-0.5, 10.0), place(-2.0, 30.0)],
    [place(0.0, 0.5), place(-0.5, 12.0), place(-2.0, 36.0)],
    [place(0.0, 0.33), place(-0.6, 8.0), place(-2.5, 25.0)],
];

/// Position offset and uniform scale for a terrain at a display size.
pub fn stage_placement(terrain_index: usize, scale: DisplayScale) -> Result<StagePlacement, SceneError> {
    STAGE_PLACEMENTS
        .get(terrain_index)
        .map(|row| row[scale.index()])
        .ok_or(SceneError::UnknownTerrain(terrain_index))
}

/// 0 daylight+clear, 1 daylight+wet, 2 night+clear, 3 night+wet.
pub fn tint_index(is_daylight: bool, condition: Condition) -> usize {
    let base = if is_daylight { 0 } else { 2 };
    if condition.is_clear() { base } else { base + 1 }
}

const SKY_TINTS: [Rgba; 4] = [
    Rgba::rgb(0.463, 0.788, 0.906),
    Rgba::rgb(0.735, 0.787, 0.815),
    Rgba::rgb(0.062, 0.18, 0.404),
    Rgba::rgb(0.018, 0.054, 0.122),
];

const CLOUD_TINTS: [Rgba; 4] = [
    Rgba::rgba(0.96, 0.96, 0.96, 0.6),
    Rgba::rgba(0.5, 0.5, 0.5, 0.9),
    Rgba::rgba(0.5, 0.5, 0.5, 0.8),
    Rgba::rgba(0.25, 0.25, 0.25, 0.9),
];

const RAIN_TINTS: [Rgba; 4] = [
    Rgba::rgba(0.8, 0.8, 0.8, 0.5),
    Rgba::rgba(0.5, 0.5, 0.5, 0.5),
    Rgba::rgba(0.3, 0.3, 0.3, 0.5),
    Rgba::rgba(0.2, 0.2, 0.2, 0.5),
];

const SNOW_TINTS: [Rgba; 4] = [
    Rgba::rgb(0.8, 0.8, 0.8),
    Rgba::rgb(0.7, 0.7, 0.7),
    Rgba::rgb(0.6, 0.6, 0.6),
    Rgba::rgb(0.5, 0.5, 0.5),
];

pub fn sky_color(is_daylight: bool, condition: Condition) -> Rgba {
    SKY_TINTS[tint_index(is_daylight, condition)]
}

pub fn cloud_color(is_daylight: bool, condition: Condition) -> Rgba {
    CLOUD_TINTS[tint_index(is_daylight, condition)]
}

pub fn precipitation_color(is_daylight: bool, condition: Condition) -> Rgba {
    let index = tint_index(is_daylight, condition);
    match condition {
        Condition::Snow => SNOW_TINTS[index],
        Condition::Clear | Condition::Rain => RAIN_TINTS[index],
    }
}

// Rows: day clear, day rain, day snow, night clear, night rain, night snow.
type TintRows = [&'static [SurfaceTint]; 6];

const FIELD_TINTS: TintRows = [
    // green, grass, tree, trunk
    &[
        lit(0.542, 0.580, 0.464),
        lit(0.647, 0.666, 0.436),
        lit(0.767, 0.803, 0.706),
        lit(0.610, 0.546, 0.448),
    ],
    &[
        lit(0.277, 0.303, 0.233),
        lit(0.308, 0.325, 0.196),
        lit(0.428, 0.472, 0.371),
        lit(0.404, 0.350, 0.277),
    ],
    &[
        lit(0.757, 0.757, 0.757),
        lit(0.713, 0.713, 0.717),
        lit(0.799, 0.799, 0.799),
        lit(0.735, 0.677, 0.580),
    ],
    &[
        lit(0.219, 0.242, 0.196),
        lit(0.255, 0.273, 0.177),
        lit(0.182, 0.201, 0.153),
        lit(0.358, 0.308, 0.242),
    ],
    &[
        lit(0.168, 0.182, 0.153),
        lit(0.191, 0.205, 0.143),
        lit(0.113, 0.129, 0.103),
        lit(0.264, 0.228, 0.177),
    ],
    &[
        lit(0.408, 0.391, 0.395),
        lit(0.371, 0.371, 0.375),
        lit(0.491, 0.484, 0.448),
        lit(0.260, 0.246, 0.228),
    ],
];

const VILLAGE_TINTS: TintRows = [
    // ground, roof, wall
    &[lit(0.560, 0.602, 0.470), lit(0.702, 0.361, 0.290), lit(0.862, 0.823, 0.741)],
    &[lit(0.290, 0.318, 0.240), lit(0.452, 0.238, 0.196), lit(0.561, 0.540, 0.492)],
    &[lit(0.770, 0.770, 0.772), lit(0.820, 0.820, 0.826), lit(0.742, 0.716, 0.668)],
    &[lit(0.212, 0.236, 0.190), lit(0.300, 0.170, 0.150), lit(0.330, 0.318, 0.290)],
    &[lit(0.160, 0.176, 0.148), lit(0.221, 0.128, 0.114), lit(0.251, 0.243, 0.223)],
    &[lit(0.402, 0.394, 0.398), lit(0.452, 0.452, 0.460), lit(0.318, 0.305, 0.284)],
];

const TOWN_TINTS: TintRows = [
    // ground, road, facade, roof, windows
    &[
        lit(0.523, 0.571, 0.452),
        lit(0.412, 0.412, 0.420),
        lit(0.781, 0.760, 0.712),
        lit(0.452, 0.330, 0.281),
        lit(0.640, 0.760, 0.820),
    ],
    &[
        lit(0.271, 0.297, 0.228),
        lit(0.221, 0.221, 0.232),
        lit(0.482, 0.470, 0.441),
        lit(0.282, 0.205, 0.176),
        lit(0.372, 0.441, 0.482),
    ],
    &[
        lit(0.760, 0.760, 0.764),
        lit(0.532, 0.532, 0.541),
        lit(0.702, 0.690, 0.668),
        lit(0.812, 0.812, 0.818),
        lit(0.600, 0.672, 0.712),
    ],
    &[
        lit(0.205, 0.228, 0.184),
        lit(0.120, 0.120, 0.131),
        lit(0.271, 0.262, 0.243),
        lit(0.180, 0.132, 0.112),
        glow(0.980, 0.842, 0.512),
    ],
    &[
        lit(0.158, 0.172, 0.146),
        lit(0.092, 0.092, 0.101),
        lit(0.202, 0.196, 0.181),
        lit(0.132, 0.098, 0.084),
        glow(0.902, 0.771, 0.470),
    ],
    &[
        lit(0.398, 0.388, 0.392),
        lit(0.221, 0.221, 0.229),
        lit(0.292, 0.283, 0.266),
        lit(0.441, 0.441, 0.450),
        glow(0.940, 0.812, 0.496),
    ],
];

const TERRAIN_TINTS: [TintRows; 3] = [FIELD_TINTS, VILLAGE_TINTS, TOWN_TINTS];

/// Material overrides for a terrain model, one entry per authored slot.
pub fn terrain_tints(
    terrain_index: usize,
    is_daylight: bool,
    condition: Condition,
) -> Result<&'static [SurfaceTint], SceneError> {
    let rows = TERRAIN_TINTS
        .get(terrain_index)
        .ok_or(SceneError::UnknownTerrain(terrain_index))?;
    let base = if is_daylight { 0 } else { 3 };
    Ok(rows[base + condition.tint_offset()])
}
