//! GPU-ready geometry buffers built from imported meshes.
//!
//! An imported mesh arrives as structured per-vertex arrays; the
//! fixed-function pipeline consumes flat float buffers. [`MeshBuffers`]
//! performs that conversion, including the axis-sign convention and the
//! rearrange optimization: large meshes are expanded into a face-ordered
//! non-indexed stream (one gather through the index buffer, then the indices
//! are discarded), small meshes keep a compact 16-bit index buffer instead.

use thiserror::Error;

use crate::import::{MeshData, SceneData};

/// Meshes with more vertices than this are rearranged into a non-indexed
/// stream; smaller meshes keep 16-bit indices (which always fit: no index can
/// exceed 65535 below this limit).
pub const REARRANGE_LIMIT: usize = 65536;

/// Default ceiling on the total vertex count of an uploaded scene.
pub const SUPREMUM_VERTICES: u32 = 65536 * 4;

/// Shift applied to the dropped translation so the scene sits inside the
/// frustum.
pub const Z_SHIFT: f32 = -3.0;

/// Scene upload validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("Failed to load scene! No meshes")]
    NoMeshes,
    #[error("Scene is too large, buffer overflow!")]
    SceneTooLarge,
}

/// Index representation of one mesh. Exactly one of the two encodings holds
/// at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKind {
    /// Compact index buffer paired with the original indexed vertex arrays.
    Short(Vec<u16>),
    /// Attributes were gathered into face order; drawing is sequential and
    /// the index buffer is gone.
    Rearranged,
}

/// Flat attribute buffers for one mesh, ready for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub num_vertices: usize,
    pub num_polygons: usize,
    /// Homogeneous positions, stride 4, axis signs flipped.
    pub vertices: Vec<f32>,
    /// Stride 3, unmodified.
    pub normals: Vec<f32>,
    /// Stride 4, present only when the source carried a first color channel.
    pub colors: Option<Vec<f32>>,
    /// Stride 2, present only when the source carried a first UV channel.
    pub texcoords: Option<Vec<f32>>,
    pub indices: IndexKind,
    /// Registry slot of the resolved texture, if any.
    pub texture_slot: Option<usize>,
}

/// Reject a scene before any buffer allocation happens.
///
/// A total vertex count exactly equal to `vertex_limit` is accepted.
pub fn validate_scene(scene: &SceneData, vertex_limit: u32) -> Result<(), SceneError> {
    if scene.meshes.is_empty() {
        return Err(SceneError::NoMeshes);
    }
    if scene.total_vertices() > vertex_limit as usize {
        return Err(SceneError::SceneTooLarge);
    }
    Ok(())
}

impl MeshBuffers {
    /// Convert one imported mesh into flat buffers.
    pub fn build(mesh: &MeshData) -> Self {
        let num_vertices = mesh.num_vertices();
        let num_polygons = mesh.num_polygons();

        // Mirror convention of the source coordinate system: negate all
        // three axes, w stays 1.
        let mut vertices = Vec::with_capacity(num_vertices * 4);
        for position in &mesh.positions {
            vertices.extend_from_slice(&[-position[0], -position[1], -position[2], 1.0]);
        }

        let normals: Vec<f32> = bytemuck::cast_slice(&mesh.normals).to_vec();
        let mut colors: Option<Vec<f32>> = mesh
            .colors
            .as_ref()
            .map(|colors| bytemuck::cast_slice(colors.as_slice()).to_vec());
        let mut texcoords: Option<Vec<f32>> = mesh
            .texcoords
            .as_ref()
            .map(|texcoords| bytemuck::cast_slice(texcoords.as_slice()).to_vec());

        let indices: Vec<u32> = bytemuck::cast_slice(&mesh.faces).to_vec();

        let (vertices, normals, index_kind) = if num_vertices > REARRANGE_LIMIT {
            let vertices = gather(&indices, &vertices, 4);
            let normals = gather(&indices, &normals, 3);
            colors = colors.map(|colors| gather(&indices, &colors, 4));
            texcoords = texcoords.map(|texcoords| gather(&indices, &texcoords, 2));
            (vertices, normals, IndexKind::Rearranged)
        } else {
            let short: Vec<u16> = indices.iter().map(|&index| index as u16).collect();
            (vertices, normals, IndexKind::Short(short))
        };

        Self {
            num_vertices,
            num_polygons,
            vertices,
            normals,
            colors,
            texcoords,
            indices: index_kind,
            texture_slot: None,
        }
    }

    /// Whether this mesh draws non-indexed.
    pub fn is_rearranged(&self) -> bool {
        matches!(self.indices, IndexKind::Rearranged)
    }
}

/// Gather `attributes` (fixed `stride` floats per vertex) through `indices`
/// into face order. All `stride` components of every element are copied.
fn gather(indices: &[u32], attributes: &[f32], stride: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(indices.len() * stride);
    for &index in indices {
        let base = index as usize * stride;
        out.extend_from_slice(&attributes[base..base + stride]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::MaterialData;

    fn quad_mesh() -> MeshData {
        MeshData {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            colors: None,
            texcoords: None,
            faces: vec![[0, 1, 2], [0, 2, 3]],
            material_index: 0,
        }
    }

    /// Synthetic mesh just over the rearrange limit; every attribute encodes
    /// its own vertex index so the gather can be verified positionally.
    fn large_mesh() -> MeshData {
        let count = REARRANGE_LIMIT + 1;
        let positions: Vec<[f32; 3]> = (0..count).map(|i| [i as f32, 0.0, 0.0]).collect();
        let normals: Vec<[f32; 3]> = (0..count).map(|i| [i as f32, 1.0, 2.0]).collect();
        let colors: Vec<[f32; 4]> = (0..count).map(|i| [i as f32, 0.1, 0.2, 0.3]).collect();
        let texcoords: Vec<[f32; 2]> = (0..count).map(|i| [i as f32, 0.5]).collect();
        MeshData {
            positions,
            normals,
            colors: Some(colors),
            texcoords: Some(texcoords),
            faces: vec![[0, 65536, 3], [30000, 2, 1]],
            material_index: 0,
        }
    }

    #[test]
    fn positions_are_mirrored_and_homogeneous() {
        let buffers = MeshBuffers::build(&quad_mesh());
        assert_eq!(buffers.vertices.len(), 4 * 4);
        assert_eq!(&buffers.vertices[4..8], &[-1.0, -0.0, -0.0, 1.0]);
        assert_eq!(buffers.normals.len(), 4 * 3);
        // Normals keep their signs.
        assert_eq!(&buffers.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn small_mesh_keeps_short_indices() {
        let buffers = MeshBuffers::build(&quad_mesh());
        match &buffers.indices {
            IndexKind::Short(short) => {
                assert_eq!(short.len(), buffers.num_polygons * 3);
                assert_eq!(short, &[0, 1, 2, 0, 2, 3]);
            }
            IndexKind::Rearranged => panic!("small mesh must stay indexed"),
        }
    }

    #[test]
    fn short_indices_round_trip_source_faces() {
        let mesh = quad_mesh();
        let buffers = MeshBuffers::build(&mesh);
        let IndexKind::Short(short) = &buffers.indices else {
            panic!("expected short indices");
        };
        let flat: Vec<u32> = mesh.faces.iter().flatten().copied().collect();
        assert!(flat
            .iter()
            .zip(short.iter())
            .all(|(&wide, &narrow)| wide == narrow as u32));
    }

    #[test]
    fn mesh_at_limit_is_not_rearranged() {
        let count = REARRANGE_LIMIT;
        let mesh = MeshData {
            positions: vec![[0.0; 3]; count],
            normals: vec![[0.0; 3]; count],
            faces: vec![[0, 1, (count - 1) as u32]],
            ..Default::default()
        };
        let buffers = MeshBuffers::build(&mesh);
        assert!(!buffers.is_rearranged());
        let IndexKind::Short(short) = &buffers.indices else {
            panic!("expected short indices");
        };
        // The largest possible index below the limit still fits in 16 bits.
        assert_eq!(short[2], (count - 1) as u16);
    }

    #[test]
    fn large_mesh_is_rearranged_across_all_channels() {
        let mesh = large_mesh();
        let buffers = MeshBuffers::build(&mesh);
        assert!(buffers.is_rearranged());

        let face_indices: Vec<u32> = mesh.faces.iter().flatten().copied().collect();
        let stream_len = face_indices.len();
        assert_eq!(buffers.vertices.len(), stream_len * 4);
        assert_eq!(buffers.normals.len(), stream_len * 3);
        let colors = buffers.colors.as_ref().expect("colors survive rearrange");
        let texcoords = buffers
            .texcoords
            .as_ref()
            .expect("texcoords survive rearrange");
        assert_eq!(colors.len(), stream_len * 4);
        assert_eq!(texcoords.len(), stream_len * 2);

        for (slot, &index) in face_indices.iter().enumerate() {
            let tag = index as f32;
            // Position x was mirrored at copy time, so the gathered value
            // carries the flipped sign.
            assert_eq!(buffers.vertices[slot * 4], -tag);
            assert_eq!(buffers.vertices[slot * 4 + 3], 1.0);
            // Every component of the wider attributes must be gathered, not
            // just the first.
            assert_eq!(&buffers.normals[slot * 3..slot * 3 + 3], &[tag, 1.0, 2.0]);
            assert_eq!(
                &colors[slot * 4..slot * 4 + 4],
                &[tag, 0.1, 0.2, 0.3]
            );
            assert_eq!(&texcoords[slot * 2..slot * 2 + 2], &[tag, 0.5]);
        }
    }

    #[test]
    fn empty_scene_is_rejected() {
        let scene = SceneData::new(vec![], vec![MaterialData::new("unused")]);
        assert_eq!(
            validate_scene(&scene, SUPREMUM_VERTICES),
            Err(SceneError::NoMeshes)
        );
    }

    #[test]
    fn vertex_ceiling_is_inclusive() {
        let scene = SceneData::new(vec![quad_mesh(), quad_mesh()], vec![]);
        // Two quads: 8 vertices total.
        assert_eq!(validate_scene(&scene, 8), Ok(()));
        assert_eq!(validate_scene(&scene, 7), Err(SceneError::SceneTooLarge));
    }
}
