//! View transform driven by gestures.

use glam::Vec3;

use crate::events::{Rotation, Translation, Zoom};
use crate::resources::Z_SHIFT;

/// Translation, rotation and scale of the viewed scene.
///
/// Rotation is kept as per-axis angles in degrees plus the three axis
/// direction vectors the fixed-function pipeline rotates around, matching
/// how the frame is composed (`rotate(angle, axis)` three times rather than
/// one quaternion).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub translation: Vec3,
    /// Per-axis rotation angles in degrees.
    pub angles: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub scale: Vec3,
}

impl Default for ViewTransform {
    /// The dropped (home) pose.
    fn default() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, Z_SHIFT),
            angles: Vec3::new(0.0, 180.0, 180.0),
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
            scale: Vec3::ONE,
        }
    }
}

impl ViewTransform {
    /// Pan: replaces the current translation.
    pub fn apply_translation(&mut self, gesture: &Translation) {
        self.translation = Vec3::new(gesture.x, gesture.y, gesture.z);
    }

    /// Rotate: accumulates each delta onto its axis when that axis is
    /// enabled by the gesture.
    pub fn apply_rotation(&mut self, gesture: &Rotation) {
        if gesture.x_axis {
            self.angles.x += gesture.angle_x;
        }
        if gesture.y_axis {
            self.angles.y += gesture.angle_y;
        }
        if gesture.z_axis {
            self.angles.z += gesture.angle_z;
        }
    }

    /// Zoom: replaces the current per-axis scale.
    pub fn apply_zoom(&mut self, gesture: &Zoom) {
        self.scale = Vec3::new(gesture.scale_x, gesture.scale_y, gesture.scale_z);
    }

    pub fn drop_translation(&mut self) {
        self.translation = Vec3::new(0.0, 0.0, Z_SHIFT);
    }

    pub fn drop_rotation(&mut self) {
        self.angles = Vec3::new(0.0, 180.0, 180.0);
        self.x_axis = Vec3::X;
        self.y_axis = Vec3::Y;
        self.z_axis = Vec3::Z;
    }

    pub fn drop_zoom(&mut self) {
        self.scale = Vec3::ONE;
    }

    pub fn drop_all(&mut self) {
        self.drop_translation();
        self.drop_rotation();
        self.drop_zoom();
    }
}
