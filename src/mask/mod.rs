//! Builds the feathered edit mask and the optional color hint from a selection.

use image::{imageops, GrayImage, Rgba, RgbaImage};

use crate::brush::BrushLayer;
use crate::canvas::codec::{encode_png, EncodeError};
use crate::raster::rasterize_polygon;
use crate::selection::Selection;

/// Feather radii above this are clamped; larger blurs wash out any selection.
pub const MAX_FEATHER_RADIUS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPayload {
    /// White pixels whose alpha is the edit strength.
    pub mask: RgbaImage,
    /// Brush colors limited to the feathered selection; absent without brush content.
    pub color_hint: Option<RgbaImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMask {
    pub mask_png: Vec<u8>,
    pub color_hint_png: Option<Vec<u8>>,
}

impl MaskPayload {
    pub fn encode(&self) -> Result<EncodedMask, EncodeError> {
        Ok(EncodedMask {
            mask_png: encode_png(&self.mask)?,
            color_hint_png: self.color_hint.as_ref().map(encode_png).transpose()?,
        })
    }
}

/// Derives the payload sent with an edit request.
///
/// Returns `None` without a committed selection. The mask is sized like the
/// brush layer, which always matches the canvas.
pub fn build_mask(
    selection: Option<&Selection>,
    brush: &BrushLayer,
    feather_radius: u32,
) -> Option<MaskPayload> {
    let selection = selection?;
    let (width, height) = brush.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let coverage = feather(&rasterize_polygon(selection.path(), width, height), feather_radius);
    let mask = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([255, 255, 255, coverage.get_pixel(x, y)[0]])
    });
    let color_hint = brush
        .has_content()
        .then(|| mask_color_hint(brush.pixels(), &coverage));

    tracing::debug!(
        width,
        height,
        feather_radius,
        has_color_hint = color_hint.is_some(),
        "mask built"
    );
    Some(MaskPayload { mask, color_hint })
}

/// Gaussian blur of the coverage with `radius` as the standard deviation.
///
/// A zero radius returns the coverage unchanged.
pub fn feather(coverage: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return coverage.clone();
    }
    let sigma = radius.min(MAX_FEATHER_RADIUS) as f32;
    imageops::blur(coverage, sigma)
}

/// Brush pixels with their alpha multiplied by the mask coverage.
fn mask_color_hint(brush: &RgbaImage, coverage: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(brush.width(), brush.height(), |x, y| {
        let Rgba([r, g, b, a]) = *brush.get_pixel(x, y);
        let strength = u16::from(coverage.get_pixel(x, y)[0]);
        let alpha = ((u16::from(a) * strength + 127) / 255) as u8;
        if alpha == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([r, g, b, alpha])
        }
    })
}
