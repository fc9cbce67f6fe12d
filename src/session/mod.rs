//! The editing session: single owner of the image, selection, brush and edit state.
//!
//! Every user-facing handler funnels through [`EditorSession`]. Rejected
//! operations set an error status and leave the model untouched.

mod actions;

use std::sync::Arc;
use std::time::Duration;

use image::{imageops, Pixel, RgbaImage};

use crate::brush::{ApplyOutcome, BrushState, UndoOutcome};
use crate::canvas::codec::{decode_image, decode_image_with_mime, encode_png, MIME_IMAGE_PNG};
use crate::canvas::{ImageStore, LoadOptions};
use crate::config::{AppConfig, PromptPreset};
use crate::edit::{
    submit_with_timeout, EditParams, EditRequest, EditResponse, EditService, EditServiceError,
    DEFAULT_EDIT_TIMEOUT,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::geometry::{Bounds, Color, Point};
use crate::mask::{self, MaskPayload, MAX_FEATHER_RADIUS};
use crate::raster;
use crate::selection::{Selection, SelectionEngine, SelectionMode};
use crate::status::StatusMessage;
use crate::viewport::Viewport;

pub use actions::ActionAvailability;

pub type PointerId = u64;

pub const PATCH_FILE_NAME: &str = "inpainter-patch.png";

const DEFAULT_BRUSH_COLOR: Color = Color::new(0x00, 0xff, 0x7f);
const DEFAULT_BRUSH_SIZE: u32 = 24;
const DEFAULT_WORKSPACE: (u32, u32) = (1280, 800);

const STATUS_LOADED: &str = "Image loaded. Select an area to start editing.";
const STATUS_RESET: &str = "Canvas reset to the original upload.";
const STATUS_CROPPED: &str = "Cropped selection ready. Continue editing.";
const STATUS_CROP_WITHOUT_SELECTION: &str = "Select an area before cropping.";
const STATUS_LOAD_FAILED: &str = "Failed to load image.";
const STATUS_BRUSH_APPLIED: &str = "Brush strokes applied to image.";
const STATUS_BRUSH_SIZE_MISMATCH: &str = "Brush layer does not match the image; nothing applied.";
const STATUS_STROKE_UNDONE: &str = "Undid last brush stroke.";
const STATUS_APPLY_UNDONE: &str = "Undid apply brush operation.";
const STATUS_FILLED: &str = "Area filled with color. You can continue editing or download.";
const STATUS_EDIT_RUNNING: &str = "Calling Gemini, please wait...";
const STATUS_EDIT_DONE: &str = "Redraw complete. You can download or continue editing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Rectangle,
    Lasso,
    Brush,
}

impl Tool {
    pub const fn selection_mode(self) -> Option<SelectionMode> {
        match self {
            Self::Rectangle => Some(SelectionMode::Rectangle),
            Self::Lasso => Some(SelectionMode::Lasso),
            Self::Brush => None,
        }
    }
}

/// A submitted edit: the request for the service plus the bounds the patch is cut with.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    request: EditRequest,
    bounds: Bounds,
    /// Canvas the request was built from; a result for an older canvas is dropped.
    generation: u64,
}

impl PendingEdit {
    pub fn request(&self) -> &EditRequest {
        &self.request
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

#[derive(Debug)]
pub struct EditorSession {
    store: ImageStore,
    selection: SelectionEngine,
    brush: BrushState,
    viewport: Viewport,
    workspace: (u32, u32),
    status: StatusMessage,
    tool: Tool,
    brush_color: Color,
    brush_size: u32,
    feather_radius: u32,
    last_patch: Option<RgbaImage>,
    is_processing: bool,
    active_pointer: Option<PointerId>,
    edit_timeout: Duration,
    /// Bumped by every load and by `clear_all`.
    image_generation: u64,
    config: AppConfig,
    prompt_presets: Vec<PromptPreset>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            store: ImageStore::new(),
            selection: SelectionEngine::new(),
            brush: BrushState::default(),
            viewport: Viewport::new(),
            workspace: DEFAULT_WORKSPACE,
            status: StatusMessage::default(),
            tool: Tool::default(),
            brush_color: DEFAULT_BRUSH_COLOR,
            brush_size: DEFAULT_BRUSH_SIZE,
            feather_radius: 0,
            last_patch: None,
            is_processing: false,
            active_pointer: None,
            edit_timeout: DEFAULT_EDIT_TIMEOUT,
            image_generation: 0,
            config: AppConfig::default(),
            prompt_presets: Vec::new(),
        }
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let mut session = Self::new();
        session.config = config.clone();
        session.set_brush_size(config.brush_size);
        session.set_feather_radius(config.feather_radius);
        session.edit_timeout = config.edit_timeout();
        if let Some((_, color)) = config.palette_colors().into_iter().next() {
            session.brush_color = color;
        }
        session
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.store.current()
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.store.original()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.selection()
    }

    pub fn selection_engine(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn last_patch(&self) -> Option<&RgbaImage> {
        self.last_patch.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn brush_color(&self) -> Color {
        self.brush_color
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn feather_radius(&self) -> u32 {
        self.feather_radius
    }

    pub fn edit_timeout(&self) -> Duration {
        self.edit_timeout
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn prompt_presets(&self) -> &[PromptPreset] {
        &self.prompt_presets
    }

    pub fn set_prompt_presets(&mut self, presets: Vec<PromptPreset>) {
        self.prompt_presets = presets;
    }

    /// Request settings for `prompt` using the configured endpoint and model.
    pub fn edit_params(&self, prompt: &str, custom_model: Option<&str>) -> EditParams {
        EditParams::from_config(&self.config, prompt, custom_model)
    }

    pub fn set_edit_timeout(&mut self, timeout: Duration) {
        self.edit_timeout = timeout;
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush_color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.max(1);
    }

    pub fn set_feather_radius(&mut self, radius: u32) {
        self.feather_radius = radius.min(MAX_FEATHER_RADIUS);
    }

    pub fn set_workspace_size(&mut self, width: u32, height: u32) {
        self.workspace = (width, height);
    }

    pub fn fit_to_workspace(&mut self) {
        if let Some(dimensions) = self.store.dimensions() {
            self.viewport.fit(dimensions, self.workspace);
        }
    }

    /// Switching tools abandons any gesture still in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        self.selection.cancel();
        self.active_pointer = None;
        self.tool = tool;
        tracing::debug!(?tool, "tool changed");
    }

    /// Decodes an upload and makes it the new canvas.
    pub fn load_bytes(&mut self, bytes: &[u8], mime_type: Option<&str>) -> AppResult<()> {
        let decoded = match mime_type {
            Some(mime_type) => decode_image_with_mime(bytes, mime_type),
            None => decode_image(bytes),
        };
        match decoded {
            Ok(image) => {
                self.load_image(image, LoadOptions::default());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "image upload rejected");
                self.status = StatusMessage::error(STATUS_LOAD_FAILED);
                Err(err.into())
            }
        }
    }

    /// Installs a decoded image as the canvas and resets all per-image state.
    pub fn load_image(&mut self, image: RgbaImage, options: LoadOptions) {
        let (width, height) = image.dimensions();
        self.store.load(image, &options);
        self.image_generation = self.image_generation.wrapping_add(1);
        self.selection.clear();
        self.active_pointer = None;
        self.brush.reset(width, height);
        self.last_patch = None;
        self.viewport.fit((width, height), self.workspace);
        self.status = StatusMessage::info(
            options
                .status_message
                .unwrap_or_else(|| STATUS_LOADED.to_string()),
        );
        tracing::info!(
            width,
            height,
            is_reset = options.is_reset,
            preserve_original = options.preserve_original,
            "image loaded"
        );
    }

    /// Reloads the original upload. Returns `false` when there is nothing to reset to.
    pub fn reset(&mut self) -> bool {
        let Some(original) = self.store.original_for_reset() else {
            return false;
        };
        let mut options = LoadOptions::reset();
        options.status_message = Some(STATUS_RESET.to_string());
        self.load_image(original, options);
        true
    }

    /// Replaces the canvas with the selected region; the original upload is kept for reset.
    pub fn crop(&mut self) -> AppResult<()> {
        if self.is_processing {
            return Err(self.reject(ValidationError::EditInProgress));
        }
        match self.store.crop_region(self.selection.bounds()) {
            Ok(region) => {
                self.load_image(region, LoadOptions::preserving_original(STATUS_CROPPED));
                Ok(())
            }
            Err(err @ (ValidationError::MissingSelection | ValidationError::MissingImage)) => {
                tracing::warn!(%err, "crop rejected");
                self.status = StatusMessage::error(STATUS_CROP_WITHOUT_SELECTION);
                Err(err.into())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Back to the state before any upload.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.image_generation = self.image_generation.wrapping_add(1);
        self.selection.clear();
        self.brush.reset(0, 0);
        self.last_patch = None;
        self.active_pointer = None;
        self.viewport.set_actual_size();
        self.status = StatusMessage::default();
        tracing::info!("session cleared");
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.active_pointer = None;
    }

    /// Pointer press on the canvas, in image coordinates.
    pub fn pointer_down(&mut self, pointer: PointerId, point: Point) -> AppResult<()> {
        if !self.store.has_image() || self.active_pointer.is_some() {
            return Ok(());
        }
        match self.tool.selection_mode() {
            Some(mode) => self.selection.begin(mode, point)?,
            None => {
                self.brush.start_stroke();
                self.brush
                    .stroke_dab(point, self.brush_color, self.brush_size);
            }
        }
        self.active_pointer = Some(pointer);
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> AppResult<()> {
        if self.active_pointer != Some(pointer) {
            return Ok(());
        }
        match self.tool {
            Tool::Brush => {
                self.brush
                    .stroke_dab(point, self.brush_color, self.brush_size);
            }
            Tool::Rectangle | Tool::Lasso => {
                if self.selection.is_drawing() {
                    self.selection.extend(point)?;
                }
            }
        }
        Ok(())
    }

    /// Pointer release. Returns the bounds of a newly committed selection.
    ///
    /// A committed selection clears the brush layer. Rejected gestures set an
    /// error status and keep the previous selection.
    pub fn pointer_up(&mut self, pointer: PointerId, point: Point) -> AppResult<Option<Bounds>> {
        if self.active_pointer != Some(pointer) {
            return Ok(None);
        }
        self.active_pointer = None;
        if self.tool == Tool::Brush || !self.selection.is_drawing() {
            return Ok(None);
        }
        match self.selection.finish(point) {
            Ok(bounds) => {
                self.brush.clear_layer();
                Ok(Some(bounds))
            }
            Err(AppError::Validation(err)) => {
                self.status = StatusMessage::error(err.status_text());
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    /// Pointer lost (capture released by the platform); abandons the gesture.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if self.active_pointer != Some(pointer) {
            return;
        }
        self.active_pointer = None;
        self.selection.cancel();
    }

    /// Paints the selected region of the canvas with `color`.
    pub fn fill_selection(&mut self, color: Color) -> AppResult<()> {
        let Some(selection) = self.selection.selection() else {
            return Err(self.reject(ValidationError::MissingSelection));
        };
        let path = selection.path().to_vec();
        let Some(current) = self.store.current_mut() else {
            return Err(self.reject(ValidationError::MissingImage));
        };

        let coverage = raster::rasterize_polygon(&path, current.width(), current.height());
        let fill = color.to_pixel();
        for (x, y, pixel) in current.enumerate_pixels_mut() {
            if coverage.get_pixel(x, y)[0] > 0 {
                pixel.blend(&fill);
            }
        }
        self.brush.clear_layer();
        self.status = StatusMessage::success(STATUS_FILLED);
        tracing::info!(?color, "selection filled");
        Ok(())
    }

    /// Merges brush strokes into the canvas.
    pub fn apply_brush(&mut self) -> ApplyOutcome {
        let Some(current) = self.store.current_mut() else {
            return ApplyOutcome::Empty;
        };
        let outcome = self.brush.apply(current);
        match outcome {
            ApplyOutcome::Applied => {
                self.status = StatusMessage::success(STATUS_BRUSH_APPLIED);
                tracing::info!("brush applied");
            }
            ApplyOutcome::SizeMismatch => {
                self.status = StatusMessage::error(STATUS_BRUSH_SIZE_MISMATCH);
            }
            ApplyOutcome::Empty => {}
        }
        outcome
    }

    /// Undoes the last stroke, or asks for confirmation before undoing an apply.
    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = self.brush.undo();
        if outcome == UndoOutcome::StrokeUndone {
            self.status = StatusMessage::info(STATUS_STROKE_UNDONE);
        }
        tracing::debug!(?outcome, "undo");
        outcome
    }

    pub fn confirm_apply_undo(&mut self) -> bool {
        let Some(checkpoint) = self.brush.confirm_apply_undo() else {
            return false;
        };
        self.store.replace_current(checkpoint);
        self.status = StatusMessage::info(STATUS_APPLY_UNDONE);
        tracing::info!("brush apply undone");
        true
    }

    pub fn clear_brush_layer(&mut self) {
        self.brush.clear_layer();
    }

    /// Mask payload for the committed selection at the current feather radius.
    pub fn build_mask(&self) -> Option<MaskPayload> {
        mask::build_mask(
            self.selection.selection(),
            self.brush.layer(),
            self.feather_radius,
        )
    }

    /// Validates and packages an edit request, marking the session busy.
    ///
    /// Returns `Ok(None)` while another edit is in flight.
    pub fn begin_edit(&mut self, params: EditParams) -> AppResult<Option<PendingEdit>> {
        if self.is_processing {
            tracing::debug!("edit already in flight; ignoring submit");
            return Ok(None);
        }
        if !self.store.has_image() {
            return Err(self.reject(ValidationError::MissingImage));
        }
        let Some(bounds) = self.selection.bounds() else {
            return Err(self.reject(ValidationError::MissingSelection));
        };
        let prompt = params.prompt.trim();
        if prompt.is_empty() {
            return Err(self.reject(ValidationError::MissingPrompt));
        }
        let Some(payload) = self.build_mask() else {
            return Err(self.reject(ValidationError::MissingSelection));
        };

        let current = self.store.current().ok_or(ValidationError::MissingImage)?;
        let encoded = payload
            .encode()
            .and_then(|mask| Ok((encode_png(current)?, mask)));
        let (base_image, mask) = match encoded {
            Ok(encoded) => encoded,
            Err(err) => {
                self.status = StatusMessage::error(err.to_string());
                return Err(err.into());
            }
        };

        let request = EditRequest {
            prompt: prompt.to_string(),
            base_image,
            mask: mask.mask_png,
            color_hint: mask.color_hint_png,
            model: params.model,
            endpoint: params.endpoint,
            api_key: non_blank(params.api_key),
            feather: self.feather_radius,
            user_config: non_blank(params.user_config),
            selection_bounds: bounds,
        };
        self.is_processing = true;
        self.status = StatusMessage::loading(STATUS_EDIT_RUNNING);
        tracing::info!(model = %request.model, ?bounds, feather = request.feather, "edit submitted");
        Ok(Some(PendingEdit {
            request,
            bounds,
            generation: self.image_generation,
        }))
    }

    /// Splices a service result into the canvas, or reports its failure.
    ///
    /// Clears the busy flag either way. On failure the image and brush state
    /// are left as they were. A result for a canvas that was replaced or
    /// cleared since `begin_edit` is dropped.
    pub fn finish_edit(
        &mut self,
        pending: PendingEdit,
        outcome: Result<EditResponse, EditServiceError>,
    ) -> AppResult<()> {
        self.is_processing = false;
        if pending.generation != self.image_generation {
            tracing::warn!(
                submitted = pending.generation,
                current = self.image_generation,
                "canvas changed while the edit was running; result dropped"
            );
            return Err(self.reject(ValidationError::StaleEdit));
        }
        let result = outcome.and_then(|response| self.decode_edit_result(&response));
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(%err, "edit failed");
                self.status = StatusMessage::error(err.to_string());
                return Err(err.into());
            }
        };
        self.store.replace_current(image);
        self.last_patch = self.store.extract(pending.bounds);
        self.brush.clear_layer();
        self.status = StatusMessage::success(STATUS_EDIT_DONE);
        tracing::info!(bounds = ?pending.bounds, "edit result applied");
        Ok(())
    }

    /// Full round trip on a worker thread, bounded by the session's edit timeout.
    ///
    /// Returns `Ok(false)` when another edit was already in flight.
    pub fn run_edit<S>(&mut self, service: Arc<S>, params: EditParams) -> AppResult<bool>
    where
        S: EditService + Send + Sync + ?Sized + 'static,
    {
        let Some(pending) = self.begin_edit(params)? else {
            return Ok(false);
        };
        let outcome = submit_with_timeout(service, pending.request().clone(), self.edit_timeout);
        self.finish_edit(pending, outcome)?;
        Ok(true)
    }

    /// Decoded result scaled to the canvas size.
    fn decode_edit_result(&self, response: &EditResponse) -> Result<RgbaImage, EditServiceError> {
        if response.image_data.is_empty() {
            return Err(EditServiceError::MissingImageData);
        }
        let mime_type = match response.mime_type.trim() {
            "" => MIME_IMAGE_PNG,
            declared => declared,
        };
        let image = decode_image_with_mime(&response.image_data, mime_type)
            .map_err(|source| EditServiceError::UnusableImage { source })?;
        match self.store.dimensions() {
            Some((width, height)) if image.dimensions() != (width, height) => {
                tracing::debug!(
                    from = ?image.dimensions(),
                    to = ?(width, height),
                    "scaling edit result to canvas"
                );
                Ok(imageops::resize(
                    &image,
                    width,
                    height,
                    imageops::FilterType::Triangle,
                ))
            }
            _ => Ok(image),
        }
    }

    /// The last edit's patch, or the live selection region when no edit ran yet.
    pub fn extract_patch(&self) -> Option<RgbaImage> {
        self.last_patch
            .clone()
            .or_else(|| self.store.extract(self.selection.bounds()?))
    }

    pub fn export_current_png(&self) -> AppResult<Vec<u8>> {
        let current = self.store.current().ok_or(ValidationError::MissingImage)?;
        Ok(encode_png(current)?)
    }

    pub fn export_patch_png(&self) -> AppResult<Vec<u8>> {
        if !self.store.has_image() {
            return Err(ValidationError::MissingImage.into());
        }
        let patch = self.extract_patch().ok_or(ValidationError::MissingSelection)?;
        Ok(encode_png(&patch)?)
    }

    pub fn availability(&self, prompt: &str) -> ActionAvailability {
        ActionAvailability::from_session(self, prompt)
    }

    fn reject(&mut self, err: ValidationError) -> AppError {
        tracing::warn!(%err, "operation rejected");
        self.status = StatusMessage::error(err.status_text());
        err.into()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
