use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use super::tuning::FALL_EDGE_MARGIN;

const VERTICES_PER_COLUMN: usize = 8;
const FACES_PER_COLUMN: usize = 6;
const QUAD_CORNERS: u8 = 4;

// Corner indices per face: top, +x, -z, -x, +z, bottom.
const FACE_TABLE: [u32; 24] = [
    0, 1, 2, 3, //
    0, 3, 7, 4, //
    0, 4, 5, 1, //
    2, 1, 5, 6, //
    3, 2, 6, 7, //
    7, 6, 5, 4,
];

/// Inputs for one curtain: `count` thin box columns scattered over the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurtainParams {
    pub count: usize,
    /// Footprint edge of each column.
    pub width: f32,
    /// Column length from top to bottom.
    pub height: f32,
    pub stage_radius: f32,
    /// Band the column tops are scattered over, relative to the curtain.
    pub y_band: (f32, f32),
}

/// Polygon mesh of quad faces; every column owns its eight corners.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurtainMesh {
    pub positions: Vec<Vec3>,
    pub face_vertex_counts: Vec<u8>,
    pub indices: Vec<u32>,
}

impl CurtainMesh {
    pub fn column_count(&self) -> usize {
        self.positions.len() / VERTICES_PER_COLUMN
    }

    /// Splits each quad into two triangles for renderers without polygon
    /// primitives.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.indices.len() / 4 * 6);
        for quad in self.indices.chunks_exact(4) {
            out.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
        }
        out
    }
}

/// Builds a rain or snow curtain. Returns `None` for an empty curtain.
///
/// Column origins are drawn in polar form with the angle over `[0, 4PI)`.
pub fn build_curtain_mesh<R: Rng>(params: &CurtainParams, rng: &mut R) -> Option<CurtainMesh> {
    if params.count == 0 {
        return None;
    }

    let fall_radius = (params.stage_radius - FALL_EDGE_MARGIN).max(0.0);
    let (band_low, band_high) = if params.y_band.0 <= params.y_band.1 {
        params.y_band
    } else {
        (params.y_band.1, params.y_band.0)
    };
    let half = params.width / 2.0;

    let mut mesh = CurtainMesh {
        positions: Vec::with_capacity(params.count * VERTICES_PER_COLUMN),
        face_vertex_counts: Vec::with_capacity(params.count * FACES_PER_COLUMN),
        indices: Vec::with_capacity(params.count * FACE_TABLE.len()),
    };

    for column in 0..params.count {
        let radius = rng.random_range(0.0..=fall_radius);
        let angle = rng.random_range(0.0..4.0 * PI);
        let top = rng.random_range(band_low..=band_high);
        let origin = Vec3::new(radius * angle.cos(), top, radius * angle.sin());
        let bottom = origin.y - params.height;

        mesh.positions.extend_from_slice(&[
            Vec3::new(origin.x + half, origin.y, origin.z - half),
            Vec3::new(origin.x - half, origin.y, origin.z - half),
            Vec3::new(origin.x - half, origin.y, origin.z + half),
            Vec3::new(origin.x + half, origin.y, origin.z + half),
            Vec3::new(origin.x + half, bottom, origin.z - half),
            Vec3::new(origin.x - half, bottom, origin.z - half),
            Vec3::new(origin.x - half, bottom, origin.z + half),
            Vec3::new(origin.x + half, bottom, origin.z + half),
        ]);
        mesh.face_vertex_counts
            .extend(std::iter::repeat_n(QUAD_CORNERS, FACES_PER_COLUMN));
        let offset = (column * VERTICES_PER_COLUMN) as u32;
        mesh.indices.extend(FACE_TABLE.iter().map(|corner| corner + offset));
    }

    Some(mesh)
}
