pub mod assets;
pub mod catalog;
pub mod clouds;
pub mod composer;
pub mod error;
pub mod graph;
pub mod mesh;
pub mod precipitation;
pub mod tuning;

pub use composer::{SceneComposer, SceneSummary};
pub use error::{SceneError, TuningError};
