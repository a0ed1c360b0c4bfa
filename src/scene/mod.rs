//! Worker-owned render state: transform and decorations.

pub mod decor;
pub mod transform;

pub use decor::{parse_hex_color, AxisLine, Decorations, AXIS_LINE_WIDTH, DEFAULT_BACKGROUND};
pub use transform::ViewTransform;
