//! Binary coverage rasterization through `tiny_skia`.
//!
//! Anti-aliasing stays off so a pixel is covered exactly when its centre lies
//! inside the path under the nonzero winding rule.

use image::{imageops, GrayImage};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};

use crate::geometry::Point;

/// Coverage of a path clipped to a canvas, positioned at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub x: u32,
    pub y: u32,
    /// 255 where covered, 0 elsewhere.
    pub alpha: GrayImage,
}

impl Coverage {
    pub fn covered(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.alpha
            .enumerate_pixels()
            .filter(|(_, _, value)| value[0] > 0)
            .map(|(x, y, _)| (self.x + x, self.y + y))
    }
}

/// Closed polygon through `points`. `None` with fewer than three points or no area.
pub fn polygon_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.len() < 2 {
        return None;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32, first.y as f32);
    for point in rest {
        builder.line_to(point.x as f32, point.y as f32);
    }
    builder.close();
    builder.finish()
}

pub fn circle_path(center: Point, radius: f64) -> Option<Path> {
    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
}

/// Rasterizes `path` over the part of its bounds that lies on a `width` x `height` canvas.
///
/// Returns `None` when the path misses the canvas entirely.
pub fn rasterize(path: &Path, width: u32, height: u32) -> Option<Coverage> {
    let bounds = path.bounds();
    let left = (bounds.left().floor() as i64).max(0);
    let top = (bounds.top().floor() as i64).max(0);
    let right = (bounds.right().ceil() as i64).min(i64::from(width));
    let bottom = (bounds.bottom().ceil() as i64).min(i64::from(height));
    if right <= left || bottom <= top {
        return None;
    }
    let (x, y) = (left as u32, top as u32);
    let (region_width, region_height) = ((right - left) as u32, (bottom - top) as u32);

    let mut pixmap = Pixmap::new(region_width, region_height)?;
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = false;
    pixmap.fill_path(
        path,
        &paint,
        FillRule::Winding,
        Transform::from_translate(-(left as f32), -(top as f32)),
        None,
    );

    let alpha = pixmap.data().chunks_exact(4).map(|pixel| pixel[3]).collect();
    let alpha = GrayImage::from_raw(region_width, region_height, alpha)?;
    Some(Coverage { x, y, alpha })
}

/// Full-canvas coverage of the polygon through `points`.
pub fn rasterize_polygon(points: &[Point], width: u32, height: u32) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    let coverage = polygon_path(points).and_then(|path| rasterize(&path, width, height));
    if let Some(coverage) = coverage {
        imageops::replace(
            &mut canvas,
            &coverage.alpha,
            i64::from(coverage.x),
            i64::from(coverage.y),
        );
    }
    canvas
}
