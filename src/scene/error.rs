use thiserror::Error;

use super::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("model `{name}` could not be loaded")]
    AssetMissing { name: String },
    #[error("model `{model}` has {actual} material slots, tint table expects {expected}")]
    MaterialShapeMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("terrain index {0} is not in the stage catalog")]
    UnknownTerrain(usize),
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("rain height {rain_height} exceeds unit height {unit_height}")]
    RainTallerThanUnit { rain_height: f32, unit_height: f32 },
}
