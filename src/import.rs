//! Data model of the external import pipeline.
//!
//! The viewer does not parse 3D formats itself; an external importer produces
//! a [`SceneData`] which is posted through the scene-upload event. Texture
//! pixels are likewise decoded by an external codec behind the
//! [`TextureLoader`] trait, invoked on the render worker during upload.

use crate::backend::types::TextureData;

/// Texture binding categories a material can declare, in resolution priority
/// order: when a material binds several textures, the first category with a
/// non-empty name wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    None,
    Diffuse,
    Specular,
    Ambient,
    Emissive,
    Height,
    Normals,
    Shininess,
    Opacity,
    Displacement,
    Lightmap,
    Reflection,
    Unknown,
}

impl TextureKind {
    /// Fixed search order for [`MaterialData::first_texture`].
    pub const PRIORITY: [TextureKind; 13] = [
        TextureKind::None,
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Ambient,
        TextureKind::Emissive,
        TextureKind::Height,
        TextureKind::Normals,
        TextureKind::Shininess,
        TextureKind::Opacity,
        TextureKind::Displacement,
        TextureKind::Lightmap,
        TextureKind::Reflection,
        TextureKind::Unknown,
    ];
}

/// One imported mesh: parallel per-vertex attribute arrays plus triangular
/// face connectivity.
///
/// Only the first color channel and first UV channel survive the import, so
/// both are plain `Option`s here.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub texcoords: Option<Vec<[f32; 2]>>,
    pub faces: Vec<[u32; 3]>,
    pub material_index: usize,
}

impl MeshData {
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_polygons(&self) -> usize {
        self.faces.len()
    }
}

/// One imported material: texture file names per binding category.
#[derive(Debug, Clone, Default)]
pub struct MaterialData {
    pub name: String,
    textures: Vec<(TextureKind, String)>,
}

impl MaterialData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: Vec::new(),
        }
    }

    pub fn with_texture(mut self, kind: TextureKind, file_name: impl Into<String>) -> Self {
        self.textures.push((kind, file_name.into()));
        self
    }

    /// File name of the material's first bound texture, searched in
    /// [`TextureKind::PRIORITY`] order.
    pub fn first_texture(&self) -> Option<&str> {
        for kind in TextureKind::PRIORITY {
            for (bound_kind, name) in &self.textures {
                if *bound_kind == kind && !name.is_empty() {
                    return Some(name);
                }
            }
        }
        None
    }
}

/// Codec collaborator: decodes one separate-file texture on demand.
///
/// `load` failure is per-texture and non-fatal; the meshes referencing it
/// simply render untextured.
pub trait TextureLoader: Send {
    /// Source file name, used for material-to-texture matching.
    fn name(&self) -> &str;

    /// Decode the image. `None` on any codec or I/O failure.
    fn load(&mut self) -> Option<TextureData>;
}

/// A fully imported scene handed over by the import pipeline.
pub struct SceneData {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    /// Separate-file textures declared by the scene, decoded lazily during
    /// upload.
    pub textures: Vec<Box<dyn TextureLoader>>,
}

impl SceneData {
    pub fn new(meshes: Vec<MeshData>, materials: Vec<MaterialData>) -> Self {
        Self {
            meshes,
            materials,
            textures: Vec::new(),
        }
    }

    pub fn with_textures(mut self, textures: Vec<Box<dyn TextureLoader>>) -> Self {
        self.textures = textures;
        self
    }

    /// Total vertex count across all meshes.
    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(MeshData::num_vertices).sum()
    }

    /// Total triangle count across all meshes.
    pub fn total_polygons(&self) -> usize {
        self.meshes.iter().map(MeshData::num_polygons).sum()
    }
}

impl std::fmt::Debug for SceneData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneData")
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_texture_follows_priority_order() {
        let material = MaterialData::new("wood")
            .with_texture(TextureKind::Normals, "wood_n.png")
            .with_texture(TextureKind::Diffuse, "wood_d.png");
        // Diffuse outranks normals regardless of declaration order.
        assert_eq!(material.first_texture(), Some("wood_d.png"));
    }

    #[test]
    fn first_texture_skips_empty_names() {
        let material = MaterialData::new("stone")
            .with_texture(TextureKind::Diffuse, "")
            .with_texture(TextureKind::Specular, "stone_s.png");
        assert_eq!(material.first_texture(), Some("stone_s.png"));
    }

    #[test]
    fn first_texture_none_for_untextured_material() {
        assert_eq!(MaterialData::new("flat").first_texture(), None);
    }

    #[test]
    fn scene_totals_sum_over_meshes() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 4],
            normals: vec![[0.0; 3]; 4],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            ..Default::default()
        };
        let scene = SceneData::new(vec![mesh.clone(), mesh], vec![]);
        assert_eq!(scene.total_vertices(), 8);
        assert_eq!(scene.total_polygons(), 4);
    }
}
