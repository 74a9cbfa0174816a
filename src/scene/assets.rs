use std::num::NonZeroUsize;

use lru::LruCache;

use super::{
    catalog::{self, BASE_MATERIAL_SLOTS, Rgba, SurfaceTint},
    error::SceneError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub unlit: bool,
    pub color: Rgba,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            unlit: false,
            color: Rgba::rgb(0.5, 0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn with_slots(name: impl Into<String>, slots: usize) -> Self {
        Self {
            name: name.into(),
            materials: vec![Material::default(); slots],
        }
    }

    /// Overrides the colour of one slot, keeping its lighting mode.
    pub fn set_slot_color(&mut self, slot: usize, color: Rgba) -> Result<(), SceneError> {
        let actual = self.materials.len();
        let material = self
            .materials
            .get_mut(slot)
            .ok_or_else(|| SceneError::MaterialShapeMismatch {
                model: self.name.clone(),
                expected: slot + 1,
                actual,
            })?;
        material.color = color;
        Ok(())
    }

    /// Applies tints slot by slot. Slots the model lacks are skipped and
    /// reported; the ones that match are still applied.
    pub fn apply_tints(&mut self, tints: &[SurfaceTint]) -> Result<(), SceneError> {
        for (material, tint) in self.materials.iter_mut().zip(tints) {
            material.unlit = tint.unlit;
            material.color = tint.color;
        }
        if self.materials.len() < tints.len() {
            return Err(SceneError::MaterialShapeMismatch {
                model: self.name.clone(),
                expected: tints.len(),
                actual: self.materials.len(),
            });
        }
        Ok(())
    }
}

/// Source of named models, e.g. a bundle of authored files.
pub trait ModelLoader {
    fn load(&self, name: &str) -> Option<Model>;
}

impl<F> ModelLoader for F
where
    F: Fn(&str) -> Option<Model>,
{
    fn load(&self, name: &str) -> Option<Model> {
        self(name)
    }
}

/// The models shipped with the stage, described by their material layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinModels;

impl ModelLoader for BuiltinModels {
    fn load(&self, name: &str) -> Option<Model> {
        if name == catalog::BASE_MODEL {
            return Some(Model::with_slots(name, BASE_MATERIAL_SLOTS));
        }
        if name == catalog::CLOUD_MODEL {
            return Some(Model::with_slots(name, 1));
        }
        let (index, _) = catalog::TERRAINS
            .iter()
            .enumerate()
            .find(|(_, terrain)| terrain.model == name)?;
        let slots = catalog::terrain_tints(index, true, crate::domain::weather::Condition::Clear)
            .map(<[SurfaceTint]>::len)
            .ok()?;
        Some(Model::with_slots(name, slots))
    }
}

const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Load-once, clone-per-use model cache keyed by asset name.
pub struct AssetCache {
    loader: Box<dyn ModelLoader + Send>,
    cache: LruCache<String, Model>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("cached", &self.cache.len())
            .field("capacity", &self.cache.cap())
            .finish_non_exhaustive()
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new(BuiltinModels)
    }
}

impl AssetCache {
    pub fn new(loader: impl ModelLoader + Send + 'static) -> Self {
        Self::with_capacity(loader, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(loader: impl ModelLoader + Send + 'static, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            loader: Box::new(loader),
            cache: LruCache::new(capacity),
        }
    }

    /// Returns an independent copy of the named model, loading it on first
    /// use.
    pub fn load_named_model(&mut self, name: &str) -> Result<Model, SceneError> {
        if let Some(model) = self.cache.get(name) {
            log::debug!("model `{name}` served from cache");
            return Ok(model.clone());
        }
        let model = self.loader.load(name).ok_or_else(|| SceneError::AssetMissing {
            name: name.to_string(),
        })?;
        log::debug!("model `{name}` loaded");
        self.cache.put(name.to_string(), model.clone());
        Ok(model)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
