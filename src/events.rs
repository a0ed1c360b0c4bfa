//! Event payloads posted by the host/UI layer.

/// Pan gesture: replaces the current scene translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Rotation gesture: per-axis enable flags plus angle deltas in degrees.
///
/// Angles accumulate onto the current rotation for every enabled axis;
/// disabled axes are left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub x_axis: bool,
    pub y_axis: bool,
    pub z_axis: bool,
    pub angle_x: f32,
    pub angle_y: f32,
    pub angle_z: f32,
}

/// Pinch gesture: replaces the current per-axis scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    pub scale_x: f32,
    pub scale_y: f32,
    pub scale_z: f32,
}

/// How loaded meshes are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawType {
    /// Vertices only.
    PointCloud,
    /// Edges only.
    Wireframe,
    /// Filled triangles.
    #[default]
    Mesh,
}
