//! CPU-side resources owned by the render worker.

pub mod mesh;
pub mod texture;

pub use mesh::{
    validate_scene, IndexKind, MeshBuffers, SceneError, REARRANGE_LIMIT, SUPREMUM_VERTICES,
    Z_SHIFT,
};
pub use texture::{normalize_name, LoadedTexture, TextureRegistry};
