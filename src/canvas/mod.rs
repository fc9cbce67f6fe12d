//! Base image buffers: the original upload and the edited working copy.

pub mod codec;

use image::{imageops, RgbaImage};

use crate::error::ValidationError;
use crate::geometry::Bounds;

/// Crops need strictly more than this many pixels along each axis.
pub const CROP_MIN_EXCLUSIVE: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reload of the stored original; keeps the existing original untouched.
    pub is_reset: bool,
    /// Keeps the current original even when this is a fresh image (crops).
    pub preserve_original: bool,
    pub status_message: Option<String>,
}

impl LoadOptions {
    pub fn reset() -> Self {
        Self {
            is_reset: true,
            ..Self::default()
        }
    }

    pub fn preserving_original(status_message: impl Into<String>) -> Self {
        Self {
            preserve_original: true,
            status_message: Some(status_message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    original: Option<RgbaImage>,
    current: Option<RgbaImage>,
}

impl ImageStore {
    pub const fn new() -> Self {
        Self {
            original: None,
            current: None,
        }
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut RgbaImage> {
        self.current.as_mut()
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(RgbaImage::dimensions)
    }

    /// Installs `image` as the working copy and decides whether it also becomes the original.
    pub fn load(&mut self, image: RgbaImage, options: &LoadOptions) {
        let keep_original =
            options.preserve_original || (options.is_reset && self.original.is_some());
        if !keep_original {
            self.original = Some(image.clone());
        }
        self.current = Some(image);
    }

    pub fn original_for_reset(&self) -> Option<RgbaImage> {
        self.original.clone()
    }

    /// Swaps in a same-sized working copy, handing back the previous one.
    pub fn replace_current(&mut self, image: RgbaImage) -> Option<RgbaImage> {
        debug_assert!(
            self.dimensions()
                .map_or(true, |dims| dims == image.dimensions()),
            "replacement must match canvas dimensions"
        );
        self.current.replace(image)
    }

    /// Sub-image of the working copy, clipped to the canvas.
    pub fn extract(&self, bounds: Bounds) -> Option<RgbaImage> {
        let current = self.current.as_ref()?;
        let clipped = bounds.intersect_image(current.width(), current.height())?;
        let x = u32::try_from(clipped.x).ok()?;
        let y = u32::try_from(clipped.y).ok()?;
        Some(imageops::crop_imm(current, x, y, clipped.width, clipped.height).to_image())
    }

    /// Cut-out used by the crop action; the caller reloads it as the new canvas.
    pub fn crop_region(&self, bounds: Option<Bounds>) -> Result<RgbaImage, ValidationError> {
        let current = self.current.as_ref().ok_or(ValidationError::MissingImage)?;
        let bounds = bounds.ok_or(ValidationError::MissingSelection)?;
        let clipped = bounds
            .intersect_image(current.width(), current.height())
            .ok_or(ValidationError::CropTooSmall {
                width: 0,
                height: 0,
            })?;
        if clipped.width <= CROP_MIN_EXCLUSIVE || clipped.height <= CROP_MIN_EXCLUSIVE {
            return Err(ValidationError::CropTooSmall {
                width: clipped.width,
                height: clipped.height,
            });
        }
        self.extract(clipped).ok_or(ValidationError::MissingSelection)
    }

    pub fn clear(&mut self) {
        self.original = None;
        self.current = None;
    }
}
