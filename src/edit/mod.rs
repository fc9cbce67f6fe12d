//! Contract with the remote generative edit service.
//!
//! The transport (HTTP proxy, vendor payloads, endpoint resolution) lives
//! outside this crate; implementations of [`EditService`] plug it in.

pub mod worker;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::geometry::Bounds;

pub use worker::{submit_with_timeout, DEFAULT_EDIT_TIMEOUT};

pub const DEFAULT_MODEL: &str = "gemini-3.0-pro-image-preview-001";

/// Everything the service needs for one edit. Images are PNG-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub prompt: String,
    pub base_image: Vec<u8>,
    pub mask: Vec<u8>,
    pub color_hint: Option<Vec<u8>>,
    pub model: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub feather: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_config: Option<String>,
    pub selection_bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub image_data: Vec<u8>,
    pub mime_type: String,
}

/// Caller-supplied request settings; the session adds images, mask and bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditParams {
    pub prompt: String,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub user_config: Option<String>,
}

impl EditParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            ..Self::default()
        }
    }

    /// Request settings seeded from the config's endpoint and selected model.
    ///
    /// A non-blank `custom_model` overrides the configured selection.
    pub fn from_config(
        config: &AppConfig,
        prompt: impl Into<String>,
        custom_model: Option<&str>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: Self::resolve_model(custom_model, config.selected_model()),
            endpoint: config.default_endpoint.clone(),
            ..Self::default()
        }
    }

    /// A non-blank custom model name wins over the picked one.
    pub fn resolve_model(custom: Option<&str>, selected: &str) -> String {
        custom
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(selected)
            .to_string()
    }
}

#[derive(Debug, Error)]
pub enum EditServiceError {
    #[error("edit service failed: {message}")]
    Failed {
        message: String,
        /// Raw diagnostic payload from the service, when it sent one.
        details: Option<serde_json::Value>,
    },
    #[error("edit service response is missing image data")]
    MissingImageData,
    #[error("edit service returned an unusable image: {source}")]
    UnusableImage {
        #[source]
        source: crate::canvas::codec::DecodeError,
    },
    #[error("edit service did not answer within {seconds}s")]
    Timeout { seconds: u64 },
    #[error("failed to start edit worker: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },
    #[error("edit worker stopped without a result")]
    WorkerDisconnected,
}

impl EditServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            details: None,
        }
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Failed { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

pub trait EditService {
    fn submit(&self, request: &EditRequest) -> Result<EditResponse, EditServiceError>;
}

impl<S: EditService + ?Sized> EditService for std::sync::Arc<S> {
    fn submit(&self, request: &EditRequest) -> Result<EditResponse, EditServiceError> {
        (**self).submit(request)
    }
}
