//! Common types shared by rendering backends.

/// Channel depths of one framebuffer configuration reported by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferConfig {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
    pub depth: u32,
    pub stencil: u32,
}

/// Properties of a successfully created window surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    /// Native pixel format id, fed back into the window buffer geometry.
    pub format: u32,
}

/// Perspective projection volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Frustum spanning the surface aspect ratio with the fixed clip planes
    /// used by the viewer (near 1, far 10).
    pub fn from_aspect(width: u32, height: u32) -> Self {
        let ratio = width as f32 / height as f32;
        Self {
            left: -ratio,
            right: ratio,
            bottom: -1.0,
            top: 1.0,
            near: 1.0,
            far: 10.0,
        }
    }
}

/// Fixed-function light presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMode {
    #[default]
    FourSpots,
    TwoSpots,
    SingleSpot,
    Sunrise,
    None,
}

/// One-time pipeline options applied after context creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub clear_color: [f32; 4],
    /// Viewport origin; the viewer outsets it by a few pixels to hide the
    /// surface border.
    pub viewport_x: i32,
    pub viewport_y: i32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub frustum: Frustum,
    pub point_size: f32,
    pub light_mode: LightMode,
}

/// Primitive assembly mode for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Points,
    Lines,
    Triangles,
    TriangleStrip,
}

/// Pixel format of decoded texture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFormat {
    Rgb8,
    #[default]
    Rgba8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Decoded texture pixels ready for upload.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

/// Borrowed per-vertex attribute arrays for one draw call.
///
/// Positions are homogeneous (stride 4), normals stride 3, colors stride 4,
/// texture coordinates stride 2. Optional channels are simply absent when the
/// mesh does not carry them.
#[derive(Debug, Clone, Copy)]
pub struct VertexStream<'a> {
    pub positions: &'a [f32],
    pub normals: Option<&'a [f32]>,
    pub colors: Option<&'a [f32]>,
    pub texcoords: Option<&'a [f32]>,
}

impl<'a> VertexStream<'a> {
    /// Number of vertices described by the position array.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frustum_follows_aspect_ratio() {
        let frustum = Frustum::from_aspect(1280, 720);
        let ratio = 1280.0 / 720.0;
        assert_eq!(frustum.left, -ratio);
        assert_eq!(frustum.right, ratio);
        assert_eq!(frustum.near, 1.0);
        assert_eq!(frustum.far, 10.0);
    }

    #[test]
    fn vertex_stream_counts_homogeneous_positions() {
        let positions = [0.0f32; 16];
        let stream = VertexStream {
            positions: &positions,
            normals: None,
            colors: None,
            texcoords: None,
        };
        assert_eq!(stream.vertex_count(), 4);
    }
}
