//! Stylized line and rectangle drawing on raster images.
//!
//! Ports the bench's box-annotation helpers to `image::RgbImage` buffers:
//! dotted, dashed and dash-dot lines and rectangles, plus the corner-bracket
//! rectangle with an optional center crosshair. Dots and dashes are placed
//! by linear interpolation between the endpoints at a fixed spacing.
//!
//! All primitives clip to the image bounds; coordinates outside the buffer
//! simply draw nothing.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// An integer pixel coordinate. May lie outside the image.
pub type Point = (i32, i32);

/// Line rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dotted,
    Dashed,
    DashDot,
}

/// Styling for [`draw_corner_rectangle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerStyle {
    /// Color of the corner brackets.
    pub corner_color: [u8; 3],
    /// Color of the thin edges (and crosshair).
    pub edge_color: [u8; 3],
    /// Length of each corner bracket arm in pixels.
    pub corner_length: i32,
    /// Thickness of the corner brackets.
    pub corner_thickness: u32,
    /// Thickness of the edges.
    pub edge_thickness: u32,
    /// Draw an edge-colored crosshair in the rectangle center.
    pub centre_cross: bool,
}

impl Default for CornerStyle {
    fn default() -> Self {
        Self {
            corner_color: [160, 180, 80],
            edge_color: [80, 90, 40],
            corner_length: 30,
            corner_thickness: 3,
            edge_thickness: 1,
            centre_cross: true,
        }
    }
}

/// Set a single pixel, ignoring out-of-bounds coordinates.
#[inline]
fn put_pixel_clipped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a filled circle.
pub fn fill_circle(img: &mut RgbImage, center: Point, radius: u32, color: Rgb<u8>) {
    let r = radius as i32;
    let r_sq = r * r;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r_sq {
                put_pixel_clipped(img, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Draw a solid line segment of the given thickness (Bresenham).
///
/// Thickness is realized by stamping a disc of radius `thickness / 2` at
/// each point along the line; thickness 1 sets single pixels.
pub fn draw_segment(img: &mut RgbImage, pt1: Point, pt2: Point, color: Rgb<u8>, thickness: u32) {
    let (mut x, mut y) = pt1;
    let (x1, y1) = pt2;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let radius = thickness / 2;

    loop {
        if radius == 0 {
            put_pixel_clipped(img, x, y, color);
        } else {
            fill_circle(img, (x, y), radius, color);
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Sample evenly spaced points along a segment, endpoints included.
///
/// The number of samples is `distance / spacing`, the scheme the original
/// helpers used; a segment shorter than twice the spacing yields too few
/// points to draw anything.
pub fn sample_points(pt1: Point, pt2: Point, spacing: u32) -> Vec<(f64, f64)> {
    let dx = (pt1.0 - pt2.0) as f64;
    let dy = (pt1.1 - pt2.1) as f64;
    let dist = dx.hypot(dy);

    let n = (dist / spacing.max(1) as f64) as usize;
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![(pt1.0 as f64, pt1.1 as f64)];
    }

    let step_x = (pt2.0 - pt1.0) as f64 / (n - 1) as f64;
    let step_y = (pt2.1 - pt1.1) as f64 / (n - 1) as f64;

    (0..n)
        .map(|i| {
            (
                pt1.0 as f64 + step_x * i as f64,
                pt1.1 as f64 + step_y * i as f64,
            )
        })
        .collect()
}

/// Draw a dotted line: one filled dot at each sampled point.
pub fn draw_dotted_line(
    img: &mut RgbImage,
    pt1: Point,
    pt2: Point,
    color: Rgb<u8>,
    thickness: u32,
    spacing: u32,
) {
    for (x, y) in sample_points(pt1, pt2, spacing) {
        fill_circle(img, (x as i32, y as i32), thickness, color);
    }
}

/// Draw a dashed line: alternate sampled intervals are filled.
pub fn draw_dashed_line(
    img: &mut RgbImage,
    pt1: Point,
    pt2: Point,
    color: Rgb<u8>,
    thickness: u32,
    spacing: u32,
) {
    let pts = sample_points(pt1, pt2, spacing);
    for i in (1..pts.len()).step_by(2) {
        let a = (pts[i - 1].0 as i32, pts[i - 1].1 as i32);
        let b = (pts[i].0 as i32, pts[i].1 as i32);
        draw_segment(img, a, b, color, thickness);
    }
}

/// Draw a dash-dot line: a dot at each sample and a dash across the middle
/// half of each interval.
pub fn draw_dashdot_line(
    img: &mut RgbImage,
    pt1: Point,
    pt2: Point,
    color: Rgb<u8>,
    thickness: u32,
    spacing: u32,
) {
    let pts = sample_points(pt1, pt2, spacing);
    for i in 1..pts.len() {
        let (x1, y1) = pts[i - 1];
        let (x2, y2) = pts[i];

        fill_circle(img, (x1 as i32, y1 as i32), thickness, color);

        let a = (
            (0.75 * x1 + 0.25 * x2) as i32,
            (0.75 * y1 + 0.25 * y2) as i32,
        );
        let b = (
            (0.25 * x1 + 0.75 * x2) as i32,
            (0.25 * y1 + 0.75 * y2) as i32,
        );
        draw_segment(img, a, b, color, thickness);
    }
}

/// Draw a line in the given style.
pub fn draw_styled_line(
    img: &mut RgbImage,
    pt1: Point,
    pt2: Point,
    color: Rgb<u8>,
    thickness: u32,
    spacing: u32,
    style: LineStyle,
) {
    match style {
        LineStyle::Solid => draw_segment(img, pt1, pt2, color, thickness),
        LineStyle::Dotted => draw_dotted_line(img, pt1, pt2, color, thickness, spacing),
        LineStyle::Dashed => draw_dashed_line(img, pt1, pt2, color, thickness, spacing),
        LineStyle::DashDot => draw_dashdot_line(img, pt1, pt2, color, thickness, spacing),
    }
}

/// Draw a rectangle from two opposite corners with styled edges.
pub fn draw_styled_rectangle(
    img: &mut RgbImage,
    pt1: Point,
    pt2: Point,
    color: Rgb<u8>,
    thickness: u32,
    spacing: u32,
    style: LineStyle,
) {
    let top_right = (pt2.0, pt1.1);
    let bottom_left = (pt1.0, pt2.1);

    draw_styled_line(img, pt1, top_right, color, thickness, spacing, style);
    draw_styled_line(img, top_right, pt2, color, thickness, spacing, style);
    draw_styled_line(img, pt2, bottom_left, color, thickness, spacing, style);
    draw_styled_line(img, bottom_left, pt1, color, thickness, spacing, style);
}

/// Draw a rectangle with corner brackets and an optional center crosshair.
///
/// Thin edges run between the brackets; each bracket extends
/// `corner_length` pixels along both edges meeting at its corner.
pub fn draw_corner_rectangle(img: &mut RgbImage, pt1: Point, pt2: Point, style: &CornerStyle) {
    let edge = Rgb(style.edge_color);
    let corner = Rgb(style.corner_color);
    let len = style.corner_length;
    let et = style.edge_thickness;
    let ct = style.corner_thickness;

    let (x1, y1) = pt1;
    let (x2, y2) = pt2;

    // Edges, leaving room for the brackets
    draw_segment(img, (x1 + len, y1), (x2 - len, y1), edge, et);
    draw_segment(img, (x2, y1 + len), (x2, y2 - len), edge, et);
    draw_segment(img, (x1, y1 + len), (x1, y2 - len), edge, et);
    draw_segment(img, (x1 + len, y2), (x2 - len, y2), edge, et);

    // Corner brackets
    draw_segment(img, (x1, y1), (x1 + len, y1), corner, ct);
    draw_segment(img, (x1, y1), (x1, y1 + len), corner, ct);
    draw_segment(img, (x2, y1), (x2 - len, y1), corner, ct);
    draw_segment(img, (x2, y1), (x2, y1 + len), corner, ct);
    draw_segment(img, (x1, y2), (x1 + len, y2), corner, ct);
    draw_segment(img, (x1, y2), (x1, y2 - len), corner, ct);
    draw_segment(img, (x2, y2), (x2 - len, y2), corner, ct);
    draw_segment(img, (x2, y2), (x2, y2 - len), corner, ct);

    if style.centre_cross {
        let cx = (x1 + x2) / 2;
        let cy = (y1 + y2) / 2;
        draw_segment(img, (cx - len, cy), (cx + len, cy), edge, et);
        draw_segment(img, (cx, cy - len), (cx, cy + len), edge, et);
    }
}

/// One annotation box, as listed in an annotation YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpec {
    /// First corner, [x, y].
    pub pt1: [i32; 2],
    /// Opposite corner, [x, y].
    pub pt2: [i32; 2],
    /// Edge style.
    pub style: BoxStyle,
    /// RGB color.
    #[serde(default = "default_box_color")]
    pub color: [u8; 3],
    /// Line thickness in pixels.
    #[serde(default = "default_box_thickness")]
    pub thickness: u32,
    /// Dot/dash spacing in pixels.
    #[serde(default = "default_box_spacing")]
    pub spacing: u32,
    /// Corner bracket settings (corner style only).
    #[serde(default)]
    pub corner: Option<CornerStyle>,
}

fn default_box_color() -> [u8; 3] {
    [200, 90, 120]
}

fn default_box_thickness() -> u32 {
    2
}

fn default_box_spacing() -> u32 {
    20
}

/// Rectangle style for annotation boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxStyle {
    Solid,
    Dotted,
    Dashed,
    DashDot,
    Corner,
}

/// Draw one annotation box onto an image.
pub fn draw_box(img: &mut RgbImage, spec: &BoxSpec) {
    let pt1 = (spec.pt1[0], spec.pt1[1]);
    let pt2 = (spec.pt2[0], spec.pt2[1]);
    let color = Rgb(spec.color);

    match spec.style {
        BoxStyle::Solid => {
            draw_styled_rectangle(img, pt1, pt2, color, spec.thickness, spec.spacing, LineStyle::Solid)
        }
        BoxStyle::Dotted => {
            draw_styled_rectangle(img, pt1, pt2, color, spec.thickness, spec.spacing, LineStyle::Dotted)
        }
        BoxStyle::Dashed => {
            draw_styled_rectangle(img, pt1, pt2, color, spec.thickness, spec.spacing, LineStyle::Dashed)
        }
        BoxStyle::DashDot => {
            draw_styled_rectangle(img, pt1, pt2, color, spec.thickness, spec.spacing, LineStyle::DashDot)
        }
        BoxStyle::Corner => {
            let mut style = spec.corner.clone().unwrap_or_default();
            style.corner_color = spec.color;
            draw_corner_rectangle(img, pt1, pt2, &style);
        }
    }
}

/// The demo layout the original annotation script rendered on a black canvas.
pub fn demo_boxes() -> Vec<BoxSpec> {
    vec![
        BoxSpec {
            pt1: [100, 100],
            pt2: [300, 300],
            style: BoxStyle::Dotted,
            color: [200, 90, 120],
            thickness: 2,
            spacing: 20,
            corner: None,
        },
        BoxSpec {
            pt1: [400, 100],
            pt2: [700, 300],
            style: BoxStyle::Dashed,
            color: [255, 100, 10],
            thickness: 2,
            spacing: 20,
            corner: None,
        },
        BoxSpec {
            pt1: [100, 350],
            pt2: [350, 550],
            style: BoxStyle::DashDot,
            color: [100, 200, 255],
            thickness: 2,
            spacing: 40,
            corner: None,
        },
        BoxSpec {
            pt1: [450, 350],
            pt2: [600, 500],
            style: BoxStyle::Corner,
            color: [160, 180, 80],
            thickness: 2,
            spacing: 20,
            corner: Some(CornerStyle::default()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_colored(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn test_sample_points_spacing() {
        let pts = sample_points((0, 0), (100, 0), 20);
        // dist / spacing = 5 samples, endpoints included
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (0.0, 0.0));
        assert_eq!(pts[4], (100.0, 0.0));
    }

    #[test]
    fn test_sample_points_short_segment() {
        assert!(sample_points((0, 0), (5, 0), 20).is_empty());
        assert_eq!(sample_points((0, 0), (25, 0), 20).len(), 1);
    }

    #[test]
    fn test_fill_circle_clips_at_borders() {
        let mut img = RgbImage::new(10, 10);
        // Center outside the canvas; only the overlapping arc may draw
        fill_circle(&mut img, (-2, 5), 3, RED);
        assert!(count_colored(&img, RED) > 0);

        // Fully outside draws nothing and does not panic
        let mut img2 = RgbImage::new(10, 10);
        fill_circle(&mut img2, (50, 50), 3, RED);
        assert_eq!(count_colored(&img2, RED), 0);
    }

    #[test]
    fn test_draw_segment_horizontal() {
        let mut img = RgbImage::new(20, 20);
        draw_segment(&mut img, (2, 10), (17, 10), RED, 1);

        for x in 2..=17 {
            assert_eq!(*img.get_pixel(x, 10), RED);
        }
        assert_eq!(count_colored(&img, RED), 16);
    }

    #[test]
    fn test_draw_segment_diagonal_connected() {
        let mut img = RgbImage::new(20, 20);
        draw_segment(&mut img, (0, 0), (19, 19), RED, 1);

        // Bresenham on a perfect diagonal hits every (i, i)
        for i in 0..20 {
            assert_eq!(*img.get_pixel(i, i), RED);
        }
    }

    #[test]
    fn test_dotted_line_draws_separated_dots() {
        let mut img = RgbImage::new(120, 20);
        draw_dotted_line(&mut img, (0, 10), (100, 10), RED, 1, 20);

        // Dots at the 5 sampled points, gaps between them
        assert_eq!(*img.get_pixel(0, 10), RED);
        assert_eq!(*img.get_pixel(100, 10), RED);
        assert_ne!(*img.get_pixel(60, 10), RED);
    }

    #[test]
    fn test_dashed_line_alternates() {
        let mut img = RgbImage::new(120, 20);
        draw_dashed_line(&mut img, (0, 10), (100, 10), RED, 1, 20);

        // First interval (0..25) is a dash, second (25..50) is a gap
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_ne!(*img.get_pixel(35, 10), RED);
    }

    #[test]
    fn test_styled_rectangle_touches_all_edges() {
        let mut img = RgbImage::new(60, 60);
        draw_styled_rectangle(&mut img, (10, 10), (50, 50), RED, 1, 5, LineStyle::Solid);

        assert_eq!(*img.get_pixel(30, 10), RED); // top
        assert_eq!(*img.get_pixel(30, 50), RED); // bottom
        assert_eq!(*img.get_pixel(10, 30), RED); // left
        assert_eq!(*img.get_pixel(50, 30), RED); // right
        assert_ne!(*img.get_pixel(30, 30), RED); // interior untouched
    }

    #[test]
    fn test_corner_rectangle_brackets_and_cross() {
        let mut img = RgbImage::new(200, 200);
        let style = CornerStyle {
            corner_color: [255, 0, 0],
            edge_color: [0, 255, 0],
            corner_length: 20,
            corner_thickness: 1,
            edge_thickness: 1,
            centre_cross: true,
        };
        draw_corner_rectangle(&mut img, (50, 50), (150, 150), &style);

        let green = Rgb([0, 255, 0]);
        assert_eq!(*img.get_pixel(55, 50), RED); // bracket arm
        assert_eq!(*img.get_pixel(100, 50), green); // thin edge midway
        assert_eq!(*img.get_pixel(100, 100), green); // crosshair center
    }

    #[test]
    fn test_corner_rectangle_without_cross() {
        let mut img = RgbImage::new(200, 200);
        let style = CornerStyle {
            centre_cross: false,
            ..CornerStyle::default()
        };
        draw_corner_rectangle(&mut img, (50, 50), (150, 150), &style);

        assert_eq!(*img.get_pixel(100, 100), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_spec_yaml_round_trip() {
        let yaml = "
pt1: [10, 10]
pt2: [90, 60]
style: dashed
color: [255, 0, 0]
";
        let spec: BoxSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.style, BoxStyle::Dashed);
        assert_eq!(spec.thickness, 2); // default
        assert_eq!(spec.spacing, 20); // default

        let mut img = RgbImage::new(100, 80);
        draw_box(&mut img, &spec);
        assert!(count_colored(&img, RED) > 0);
    }

    #[test]
    fn test_demo_boxes_draw_without_panic() {
        let mut img = RgbImage::new(800, 800);
        for spec in demo_boxes() {
            draw_box(&mut img, &spec);
        }
        // Something got drawn
        assert!(img.pixels().any(|p| *p != Rgb([0, 0, 0])));
    }
}
