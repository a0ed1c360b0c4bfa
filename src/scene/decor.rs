//! Background gradient and axis decoration buffers.

use crate::resources::Z_SHIFT;

/// MeshLab-style blue used when the host never set a background color.
pub const DEFAULT_BACKGROUND: [f32; 4] = [0.3984, 0.3984, 0.8125, 1.0];

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// Width of the axis decoration lines.
pub const AXIS_LINE_WIDTH: f32 = 5.0;

/// Parse an ARGB color string of eight hex digits, optionally `#`-prefixed.
///
/// Returns channel values in `[r, g, b, a]` order scaled to 0..=1, or `None`
/// for malformed input.
pub fn parse_hex_color(text: &str) -> Option<[f32; 4]> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |offset: usize| -> f32 {
        let value = u8::from_str_radix(&digits[offset..offset + 2], 16).unwrap_or(0);
        value as f32 / 255.0
    };
    Some([channel(2), channel(4), channel(6), channel(0)])
}

/// One colored axis segment from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    /// Two homogeneous vertices.
    pub vertices: [f32; 8],
    /// One color per vertex.
    pub colors: [f32; 8],
}

impl AxisLine {
    fn new(tip: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            vertices: [0.0, 0.0, 0.0, 1.0, tip[0], tip[1], tip[2], 1.0],
            colors: [
                color[0], color[1], color[2], color[3], color[0], color[1], color[2], color[3],
            ],
        }
    }
}

/// Cosmetic geometry drawn around the scene: the gradient background quad and
/// the unit axis tripod (X red, Y green, Z blue).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    pub background_vertices: [f32; 16],
    pub background_colors: [f32; 16],
    pub axes: [AxisLine; 3],
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            background_vertices: [0.0; 16],
            background_colors: [0.0; 16],
            axes: [
                AxisLine::new([1.0, 0.0, 0.0], RED),
                AxisLine::new([0.0, 1.0, 0.0], GREEN),
                AxisLine::new([0.0, 0.0, 1.0], BLUE),
            ],
        }
    }
}

impl Decorations {
    /// Rebuild the background quad for the current surface size.
    ///
    /// `fill` is the parsed host color, or `None` for the default
    /// background. The quad sits behind the scene at twice the home z-shift
    /// and fades from the fill color at the bottom edge to opaque black.
    pub fn set_background(&mut self, width: u32, height: u32, fill: Option<[f32; 4]>) {
        let half_width = (width / 2) as f32;
        let half_height = height / 2;
        // The default gradient is anchored to the surface midline, a host
        // supplied color fills from the bottom edge.
        let height_offset = if fill.is_some() { 0 } else { half_height };
        let band = (half_height as f32 - height_offset as f32).abs();
        let color = fill.unwrap_or(DEFAULT_BACKGROUND);
        let z = 2.0 * Z_SHIFT;

        let bottom = -band / 25.0;
        let top = band / 90.0;
        self.background_vertices = [
            -half_width, bottom, z, 1.0, //
            half_width, bottom, z, 1.0, //
            -half_width, top, z, 1.0, //
            half_width, top, z, 1.0, //
        ];
        self.background_colors = [
            color[0], color[1], color[2], color[3], //
            color[0], color[1], color[2], color[3], //
            0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 1.0, //
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_argb_hex_strings() {
        let color = parse_hex_color("#FF8040C0").expect("valid color");
        assert!((color[3] - 1.0).abs() < 1e-6); // alpha FF
        assert!((color[0] - 128.0 / 255.0).abs() < 1e-6); // red 80
        assert!((color[1] - 64.0 / 255.0).abs() < 1e-6); // green 40
        assert!((color[2] - 192.0 / 255.0).abs() < 1e-6); // blue C0

        // The prefix is optional.
        assert_eq!(parse_hex_color("FF8040C0"), Some(color));
    }

    #[test]
    fn rejects_malformed_color_strings() {
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("12345678AB"), None);
        assert_eq!(parse_hex_color("#GG8040C0"), None);
    }

    #[test]
    fn background_quad_spans_the_surface() {
        let mut decor = Decorations::default();
        decor.set_background(640, 480, Some([0.5, 0.25, 0.125, 1.0]));

        // Four homogeneous vertices mirrored around the x axis.
        assert_eq!(decor.background_vertices[0], -320.0);
        assert_eq!(decor.background_vertices[4], 320.0);
        assert_eq!(decor.background_vertices[2], 2.0 * Z_SHIFT);
        assert_eq!(decor.background_vertices[3], 1.0);

        // Fill color on the first two vertices, black on the far pair.
        assert_eq!(&decor.background_colors[0..4], &[0.5, 0.25, 0.125, 1.0]);
        assert_eq!(&decor.background_colors[8..12], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn axes_are_unit_segments_from_origin() {
        let decor = Decorations::default();
        assert_eq!(&decor.axes[0].vertices[4..8], &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&decor.axes[1].vertices[4..8], &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(&decor.axes[2].vertices[4..8], &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(&decor.axes[0].colors[0..4], &RED);
        assert_eq!(&decor.axes[1].colors[0..4], &GREEN);
        assert_eq!(&decor.axes[2].colors[0..4], &BLUE);
    }
}
