//! Zoom model for the canvas display.

use crate::geometry::Point;

const ZOOM_MIN_PERCENT: u16 = 10;
const ZOOM_MAX_PERCENT: u16 = 300;
const ZOOM_STEP_PERCENT: u16 = 25;
const ZOOM_WHEEL_STEP_PERCENT: u16 = 10;
/// Padding kept free around the canvas when fitting it into the workspace.
const WORKSPACE_PADDING_PX: u32 = 48;

fn clamp_zoom_percent(zoom_percent: u16) -> u16 {
    zoom_percent.clamp(ZOOM_MIN_PERCENT, ZOOM_MAX_PERCENT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    zoom_percent: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub const fn new() -> Self {
        Self { zoom_percent: 100 }
    }

    pub const fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    pub fn set_zoom_percent(&mut self, zoom_percent: u16) {
        self.zoom_percent = clamp_zoom_percent(zoom_percent);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom_percent(self.zoom_percent.saturating_add(ZOOM_STEP_PERCENT));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom_percent(self.zoom_percent.saturating_sub(ZOOM_STEP_PERCENT));
    }

    /// Ctrl + wheel zoom; scrolling down (positive delta) zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 {
            self.set_zoom_percent(self.zoom_percent.saturating_sub(ZOOM_WHEEL_STEP_PERCENT));
        } else if delta_y < 0.0 {
            self.set_zoom_percent(self.zoom_percent.saturating_add(ZOOM_WHEEL_STEP_PERCENT));
        }
    }

    pub fn set_actual_size(&mut self) {
        self.zoom_percent = 100;
    }

    /// Largest zoom (never above 100 %) that shows the whole image inside the workspace.
    pub fn fit(&mut self, image: (u32, u32), workspace: (u32, u32)) {
        let (image_width, image_height) = image;
        if image_width == 0 || image_height == 0 {
            return;
        }
        let available_width = f64::from(workspace.0.saturating_sub(WORKSPACE_PADDING_PX));
        let available_height = f64::from(workspace.1.saturating_sub(WORKSPACE_PADDING_PX));
        let scale = (available_width / f64::from(image_width))
            .min(available_height / f64::from(image_height))
            .min(1.0);
        let percent = (scale * 100.0).round().clamp(0.0, f64::from(u16::MAX)) as u16;
        self.set_zoom_percent(percent);
    }

    pub fn display_size(&self, image: (u32, u32)) -> (u32, u32) {
        let scale = self.scale();
        (
            (f64::from(image.0) * scale).round() as u32,
            (f64::from(image.1) * scale).round() as u32,
        )
    }

    /// Maps an offset inside the displayed canvas to image coordinates.
    pub fn to_canvas(&self, offset_x: f64, offset_y: f64) -> Point {
        let scale = self.scale();
        Point::new(offset_x / scale, offset_y / scale)
    }
}
