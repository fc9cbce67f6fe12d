use crate::canvas::codec::{DecodeError, EncodeError};
use crate::edit::EditServiceError;
use crate::selection::GestureError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    EditService(#[from] EditServiceError),
    #[error(transparent)]
    Gesture(#[from] GestureError),
}

/// User-correctable problems. The session state is never modified when one is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("selection is too small: {width}x{height}")]
    SelectionTooSmall { width: u32, height: u32 },
    #[error("lasso selection requires at least 3 points, got {count}")]
    TooFewLassoPoints { count: usize },
    #[error("no active selection")]
    MissingSelection,
    #[error("prompt is empty")]
    MissingPrompt,
    #[error("no image loaded")]
    MissingImage,
    #[error("selection is too small to crop: {width}x{height}")]
    CropTooSmall { width: u32, height: u32 },
    #[error("an edit request is already in flight")]
    EditInProgress,
    #[error("the canvas changed while the edit was running")]
    StaleEdit,
}

impl ValidationError {
    /// Status line text shown to the user.
    pub const fn status_text(&self) -> &'static str {
        match self {
            Self::SelectionTooSmall { .. } => "Selection is too small.",
            Self::TooFewLassoPoints { .. } => "Lasso selection requires more points.",
            Self::MissingSelection => "Please select an area first.",
            Self::MissingPrompt => "Enter a prompt describing the edit.",
            Self::MissingImage => "Upload an image to begin.",
            Self::CropTooSmall { .. } => "Selection is too small to crop.",
            Self::EditInProgress => "Wait for the current edit to finish.",
            Self::StaleEdit => "The image changed during the edit; result discarded.",
        }
    }
}
