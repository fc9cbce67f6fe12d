/// Shared geometric and color primitives used by the selection, brush and mask modules.
use serde::{Deserialize, Serialize};

/// Rectangles narrower or shorter than this are treated as accidental clicks.
pub const MIN_RECTANGLE_SIZE: u32 = 5;
/// Lasso gestures need at least this many recorded points to form an area.
pub const MIN_LASSO_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Corner points in drawing order, starting at the top-left corner.
    pub fn corners(&self) -> [Point; 4] {
        let left = f64::from(self.x);
        let top = f64::from(self.y);
        let right = left + f64::from(self.width);
        let bottom = top + f64::from(self.height);
        [
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ]
    }

    /// Clips the box to an image of the given size.
    ///
    /// Returns `None` when the box lies entirely outside the image.
    pub fn intersect_image(&self, image_width: u32, image_height: u32) -> Option<Bounds> {
        let left = i64::from(self.x).max(0);
        let top = i64::from(self.y).max(0);
        let right = self.right().min(i64::from(image_width));
        let bottom = self.bottom().min(i64::from(image_height));
        if right <= left || bottom <= top {
            return None;
        }

        Some(Bounds::new(
            i32::try_from(left).ok()?,
            i32::try_from(top).ok()?,
            u32::try_from(right - left).ok()?,
            u32::try_from(bottom - top).ok()?,
        ))
    }
}

/// Maps a rectangle anchored at `(x, y)` with signed extents to a canonical box.
///
/// Dragging up or left yields negative extents; the result always has a
/// top-left origin, integer coordinates and a size of at least one pixel.
pub fn normalize_rectangle(x: f64, y: f64, width: f64, height: f64) -> Bounds {
    let left = if width < 0.0 { x + width } else { x };
    let top = if height < 0.0 { y + height } else { y };
    Bounds::new(
        round_half_up(left) as i32,
        round_half_up(top) as i32,
        (round_half_up(width.abs()) as u32).max(1),
        (round_half_up(height.abs()) as u32).max(1),
    )
}

/// Tight integer envelope of a point sequence.
pub fn bounds_from_polygon(points: &[Point]) -> Option<Bounds> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for point in &points[1..] {
        min_x = min_x.min(point.x);
        max_x = max_x.max(point.x);
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }

    let left = min_x.floor();
    let top = min_y.floor();
    Some(Bounds::new(
        left as i32,
        top as i32,
        ((max_x.ceil() - left) as u32).max(1),
        ((max_y.ceil() - top) as u32).max(1),
    ))
}

/// Half-up rounding, so that `-2.5` becomes `-2` rather than `-3`.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_pixel(self) -> image::Rgba<u8> {
        image::Rgba(self.rgba())
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(digits.get(index..index + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?).with_alpha(channel(6)?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rectangle_flips_negative_extents() {
        assert_eq!(
            normalize_rectangle(50.0, 50.0, -30.0, -20.0),
            Bounds::new(20, 30, 30, 20)
        );
        assert_eq!(
            normalize_rectangle(20.0, 30.0, 30.0, 20.0),
            Bounds::new(20, 30, 30, 20)
        );
    }

    #[test]
    fn normalize_rectangle_rounds_and_floors_size_at_one() {
        assert_eq!(
            normalize_rectangle(10.4, 10.6, 0.2, -0.3),
            Bounds::new(10, 10, 1, 1)
        );
        assert_eq!(
            normalize_rectangle(-2.5, 3.5, 4.5, 2.0),
            Bounds::new(-2, 4, 5, 2)
        );
    }

    #[test]
    fn normalize_rectangle_encloses_same_area_for_every_drag_direction() {
        let drags = [(100.0, 100.0), (-100.0, 100.0), (100.0, -100.0), (-100.0, -100.0)];
        for (width, height) in drags {
            let anchor_x = if width < 0.0 { 150.0 } else { 50.0 };
            let anchor_y = if height < 0.0 { 150.0 } else { 50.0 };
            let bounds = normalize_rectangle(anchor_x, anchor_y, width, height);
            assert_eq!(bounds, Bounds::new(50, 50, 100, 100), "drag {width}x{height}");
        }
    }

    #[test]
    fn bounds_from_polygon_is_tight_envelope() {
        let points = [
            Point::new(12.2, 40.0),
            Point::new(30.0, 5.5),
            Point::new(55.7, 22.0),
        ];
        assert_eq!(
            bounds_from_polygon(&points),
            Some(Bounds::new(12, 5, 44, 35))
        );
    }

    #[test]
    fn bounds_from_polygon_floors_collinear_input_at_one_pixel() {
        let points = [Point::new(5.0, 9.0), Point::new(5.0, 9.0), Point::new(5.0, 9.0)];
        assert_eq!(bounds_from_polygon(&points), Some(Bounds::new(5, 9, 1, 1)));
        assert_eq!(bounds_from_polygon(&[]), None);
    }

    #[test]
    fn intersect_image_clips_and_rejects_outside_boxes() {
        let bounds = Bounds::new(-10, 90, 50, 40);
        assert_eq!(bounds.intersect_image(100, 100), Some(Bounds::new(0, 90, 40, 10)));
        assert_eq!(Bounds::new(120, 0, 10, 10).intersect_image(100, 100), None);
    }

    #[test]
    fn color_parses_palette_hex_values() {
        assert_eq!(Color::from_hex("#00ff7f"), Some(Color::new(0, 255, 127)));
        assert_eq!(
            Color::from_hex("11182780"),
            Some(Color::new(0x11, 0x18, 0x27).with_alpha(0x80))
        );
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }
}
