pub mod brush;
pub mod canvas;
pub mod config;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod mask;
pub mod raster;
pub mod selection;
pub mod session;
pub mod status;
pub mod viewport;
pub use error::{AppError, AppResult};

use session::EditorSession;

/// Builds a session seeded from `config.json` and the environment.
pub fn start() -> EditorSession {
    logging::init();
    let config = config::load_app_config();
    let presets = config::load_prompt_presets(&config);
    tracing::info!(
        endpoint = %config.default_endpoint,
        model = %config.selected_model(),
        presets = presets.len(),
        "starting inpainter"
    );
    let mut session = EditorSession::with_config(&config);
    session.set_prompt_presets(presets);
    session
}
