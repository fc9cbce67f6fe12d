//! Free-drawn brush overlay with two-tier undo.
//!
//! Strokes are cheap and undone from a snapshot stack without asking. Applying
//! the layer onto the base image is a destructive merge: it keeps a single
//! checkpoint of the image and undoing it needs an explicit confirmation.

pub mod history;

use image::{imageops, Rgba, RgbaImage};

use crate::geometry::{Color, Point};
use crate::raster;

pub use history::{BrushHistory, BRUSH_HISTORY_LIMIT};

#[derive(Debug, Clone)]
pub struct BrushLayer {
    pixels: RgbaImage,
    has_content: bool,
}

impl BrushLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            has_content: false,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// Paints an opaque filled circle centred on `center`.
    ///
    /// Pixels whose centres fall inside the circle are overwritten, so
    /// overlapping dabs of different colors replace rather than blend.
    pub fn dab(&mut self, center: Point, color: Color, diameter: u32) {
        let radius = f64::from(diameter.max(1)) / 2.0;
        let (width, height) = self.pixels.dimensions();
        let Some(coverage) = raster::circle_path(center, radius)
            .and_then(|path| raster::rasterize(&path, width, height))
        else {
            return;
        };

        let paint = color.with_alpha(255).to_pixel();
        for (x, y) in coverage.covered() {
            self.pixels.put_pixel(x, y, paint);
            self.has_content = true;
        }
    }

    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|pixel| *pixel = Rgba([0, 0, 0, 0]));
        self.has_content = false;
    }

    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Restores a snapshot in place and recomputes whether anything is painted.
    pub fn restore(&mut self, snapshot: RgbaImage) {
        self.has_content = snapshot.pixels().any(|pixel| pixel[3] > 0);
        self.pixels = snapshot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The layer holds no strokes.
    Empty,
    /// The target image and the layer differ in size; nothing was merged.
    SizeMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The last stroke was rolled back.
    StrokeUndone,
    /// The last action was an apply; `confirm_apply_undo` must be called to restore the image.
    ConfirmationRequired,
    Nothing,
}

#[derive(Debug, Clone)]
pub struct BrushState {
    layer: BrushLayer,
    history: BrushHistory,
    apply_checkpoint: Option<RgbaImage>,
    last_action_was_apply: bool,
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl BrushState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layer: BrushLayer::new(width, height),
            history: BrushHistory::default(),
            apply_checkpoint: None,
            last_action_was_apply: false,
        }
    }

    pub fn layer(&self) -> &BrushLayer {
        &self.layer
    }

    pub fn has_content(&self) -> bool {
        self.layer.has_content()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn has_apply_checkpoint(&self) -> bool {
        self.apply_checkpoint.is_some()
    }

    pub fn last_action_was_apply(&self) -> bool {
        self.last_action_was_apply
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty() || self.apply_undo_pending()
    }

    fn apply_undo_pending(&self) -> bool {
        self.last_action_was_apply && self.apply_checkpoint.is_some()
    }

    /// Drops everything, including the apply checkpoint, and resizes the layer.
    pub fn reset(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn start_stroke(&mut self) {
        self.history.push(self.layer.snapshot());
        self.last_action_was_apply = false;
    }

    pub fn stroke_dab(&mut self, point: Point, color: Color, diameter: u32) {
        self.layer.dab(point, color, diameter);
    }

    /// Merges the layer onto `target`, keeping the pre-merge image as the apply checkpoint.
    pub fn apply(&mut self, target: &mut RgbaImage) -> ApplyOutcome {
        if !self.layer.has_content() {
            return ApplyOutcome::Empty;
        }
        if target.dimensions() != self.layer.dimensions() {
            tracing::warn!(
                target = ?target.dimensions(),
                layer = ?self.layer.dimensions(),
                "brush layer does not match image; apply skipped"
            );
            return ApplyOutcome::SizeMismatch;
        }

        self.apply_checkpoint = Some(target.clone());
        imageops::overlay(target, self.layer.pixels(), 0, 0);
        self.history.clear();
        self.last_action_was_apply = true;
        self.layer.clear();
        ApplyOutcome::Applied
    }

    pub fn undo(&mut self) -> UndoOutcome {
        if self.apply_undo_pending() {
            return UndoOutcome::ConfirmationRequired;
        }
        match self.history.pop() {
            Some(snapshot) => {
                self.layer.restore(snapshot);
                UndoOutcome::StrokeUndone
            }
            None => UndoOutcome::Nothing,
        }
    }

    /// Hands back the pre-apply image once the user confirmed undoing an apply.
    pub fn confirm_apply_undo(&mut self) -> Option<RgbaImage> {
        if !self.last_action_was_apply {
            return None;
        }
        let checkpoint = self.apply_checkpoint.take()?;
        self.last_action_was_apply = false;
        Some(checkpoint)
    }

    /// Wipes the layer and its stroke history. An apply checkpoint survives.
    pub fn clear_layer(&mut self) {
        self.layer.clear();
        self.history.clear();
        self.last_action_was_apply = false;
    }
}
