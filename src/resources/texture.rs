//! Texture registry: uploaded textures and material-name resolution.
//!
//! Slots mirror the scene's declared separate-file textures; a slot is
//! occupied only when its loader decoded successfully and the upload went
//! through. Lookups compare normalized basenames because importers report
//! texture paths with mixed separators and casing.

use std::collections::BTreeMap;

use crate::backend::traits::TextureHandle;
use crate::backend::types::TextureFormat;
use crate::import::MaterialData;

/// A texture uploaded to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Normalized source basename used for lookups.
    name: String,
}

impl LoadedTexture {
    pub fn new(
        handle: TextureHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
        source_name: &str,
    ) -> Self {
        Self {
            handle,
            width,
            height,
            format,
            name: normalize_name(source_name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Lowercased basename with backslashes treated as path separators.
pub fn normalize_name(name: &str) -> String {
    let forward = name.replace('\\', "/");
    let base = forward.rsplit('/').next().unwrap_or("");
    base.to_ascii_lowercase()
}

/// Slot-indexed registry of the active scene's textures.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    slots: BTreeMap<usize, LoadedTexture>,
    declared: usize,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a scene that declares `declared` separate textures.
    /// Any previous contents must have been drained first.
    pub fn begin_scene(&mut self, declared: usize) {
        self.declared = declared;
    }

    pub fn insert(&mut self, slot: usize, texture: LoadedTexture) {
        self.slots.insert(slot, texture);
    }

    pub fn get(&self, slot: usize) -> Option<&LoadedTexture> {
        self.slots.get(&slot)
    }

    /// Number of successfully loaded textures.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the scene declared any separate textures at all, regardless
    /// of how many decoded successfully.
    pub fn has_textures(&self) -> bool {
        self.declared > 0
    }

    /// First slot whose texture matches `name` (normalized comparison).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        self.slots
            .iter()
            .find(|(_, texture)| texture.name == wanted)
            .map(|(&slot, _)| slot)
    }

    /// Resolve the texture slot for a mesh.
    ///
    /// A scene with exactly one declared texture maps every mesh to slot 0:
    /// with a single texture and no usable material file there is no way to
    /// tell which mesh it belongs to, so it is applied to all of them.
    /// Otherwise the mesh's material names the texture and the registry is
    /// searched by name.
    pub fn resolve_slot(&self, material: Option<&MaterialData>) -> Option<usize> {
        if !self.has_textures() {
            return None;
        }
        if self.declared == 1 {
            return Some(0);
        }
        let name = material?.first_texture()?;
        self.find_by_name(name)
    }

    /// Empty the registry, handing back the textures so their backend
    /// handles can be destroyed.
    pub fn drain(&mut self) -> Vec<LoadedTexture> {
        self.declared = 0;
        std::mem::take(&mut self.slots).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::TextureKind;

    fn texture(slot: u64, name: &str) -> LoadedTexture {
        LoadedTexture::new(TextureHandle(slot), 64, 64, TextureFormat::Rgba8, name)
    }

    #[test]
    fn names_normalize_to_lowercase_basename() {
        assert_eq!(normalize_name("Textures\\Wood\\OAK.PNG"), "oak.png");
        assert_eq!(normalize_name("models/brick.jpg"), "brick.jpg");
        assert_eq!(normalize_name("plain.bmp"), "plain.bmp");
    }

    #[test]
    fn find_by_name_ignores_path_and_case() {
        let mut registry = TextureRegistry::new();
        registry.begin_scene(2);
        registry.insert(0, texture(1, "assets/oak.png"));
        registry.insert(1, texture(2, "assets/brick.jpg"));
        assert_eq!(registry.find_by_name("C:\\export\\OAK.png"), Some(0));
        assert_eq!(registry.find_by_name("BRICK.JPG"), Some(1));
        assert_eq!(registry.find_by_name("missing.png"), None);
    }

    #[test]
    fn single_declared_texture_applies_to_every_mesh() {
        let mut registry = TextureRegistry::new();
        registry.begin_scene(1);
        registry.insert(0, texture(1, "only.png"));
        // No material needed: the sole texture is implied for all meshes.
        assert_eq!(registry.resolve_slot(None), Some(0));
    }

    #[test]
    fn multi_texture_scene_resolves_through_material() {
        let mut registry = TextureRegistry::new();
        registry.begin_scene(2);
        registry.insert(0, texture(1, "oak.png"));
        registry.insert(1, texture(2, "brick.jpg"));

        let material = MaterialData::new("walls").with_texture(TextureKind::Diffuse, "BRICK.jpg");
        assert_eq!(registry.resolve_slot(Some(&material)), Some(1));

        let unmatched = MaterialData::new("floor").with_texture(TextureKind::Diffuse, "tile.png");
        assert_eq!(registry.resolve_slot(Some(&unmatched)), None);
    }

    #[test]
    fn undeclared_textures_resolve_to_none() {
        let registry = TextureRegistry::new();
        let material = MaterialData::new("any").with_texture(TextureKind::Diffuse, "oak.png");
        assert_eq!(registry.resolve_slot(Some(&material)), None);
    }

    #[test]
    fn drain_empties_the_registry() {
        let mut registry = TextureRegistry::new();
        registry.begin_scene(1);
        registry.insert(0, texture(1, "only.png"));
        let drained = registry.drain();
        assert_eq!(drained.len(), 1);
        assert!(registry.is_empty());
        assert!(!registry.has_textures());
    }
}
