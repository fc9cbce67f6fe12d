use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::edit::DEFAULT_MODEL;
use crate::geometry::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "inpainter";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_PROMPTS_FILE: &str = "prompts.json";

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_FEATHER_RADIUS: u32 = 0;
pub const DEFAULT_BRUSH_SIZE: u32 = 24;
pub const DEFAULT_EDIT_TIMEOUT_SECS: u64 = 240;

const ENV_ENDPOINT: &str = "GEMINI_API_ENDPOINT";
const ENV_MODELS: &str = "GEMINI_MODELS";
const ENV_PROMPTS_FILE: &str = "PROMPTS_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaletteColor {
    pub label: String,
    pub value: String,
}

impl PaletteColor {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        Color::from_hex(&self.value)
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_endpoint: String,
    pub default_models: Vec<String>,
    pub default_model: Option<String>,
    pub feather_radius: u32,
    pub brush_size: u32,
    pub palette: Vec<PaletteColor>,
    pub prompts_file: Option<PathBuf>,
    pub edit_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
            default_models: default_models(),
            default_model: None,
            feather_radius: DEFAULT_FEATHER_RADIUS,
            brush_size: DEFAULT_BRUSH_SIZE,
            palette: default_palette(),
            prompts_file: None,
            edit_timeout_secs: DEFAULT_EDIT_TIMEOUT_SECS,
        }
    }
}

fn default_models() -> Vec<String> {
    [
        DEFAULT_MODEL,
        "gemini-3.0-flash",
        "gemini-1.5-pro",
        "gemini-1.5-flash",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_palette() -> Vec<PaletteColor> {
    vec![
        PaletteColor::new("Green", "#00ff7f"),
        PaletteColor::new("Red", "#ff4d4f"),
        PaletteColor::new("Blue", "#3b82f6"),
        PaletteColor::new("Yellow", "#facc15"),
        PaletteColor::new("Black", "#111827"),
        PaletteColor::new("White", "#ffffff"),
    ]
}

impl AppConfig {
    /// The explicitly configured model, else the first listed one.
    pub fn selected_model(&self) -> &str {
        self.default_model
            .as_deref()
            .or_else(|| self.default_models.first().map(String::as_str))
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn edit_timeout(&self) -> Duration {
        Duration::from_secs(self.edit_timeout_secs.max(1))
    }

    /// Palette entries that parse as colors; invalid values are skipped.
    pub fn palette_colors(&self) -> Vec<(String, Color)> {
        self.palette
            .iter()
            .filter_map(|entry| match entry.color() {
                Some(color) => Some((entry.label.clone(), color)),
                None => {
                    tracing::warn!(
                        label = %entry.label,
                        value = %entry.value,
                        "invalid palette color; skipping"
                    );
                    None
                }
            })
            .collect()
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|value| !value.trim().is_empty()) {
            self.default_endpoint = endpoint.trim().to_string();
        }
        if let Some(models) = lookup(ENV_MODELS) {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(str::to_string)
                .collect();
            if !models.is_empty() {
                self.default_models = models;
            }
        }
        if let Some(file) = lookup(ENV_PROMPTS_FILE).filter(|value| !value.trim().is_empty()) {
            self.prompts_file = Some(PathBuf::from(file.trim()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptPreset {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Default, Deserialize)]
struct PromptPresetFile {
    #[serde(default)]
    presets: Vec<PromptPreset>,
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    let mut config = load_app_config_with(xdg_config_home.as_deref(), home.as_deref());
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_app_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

fn parse_app_config(contents: &str) -> Result<AppConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Loads prompt presets from the configured file, or `prompts.json` next to `config.json`.
pub fn load_prompt_presets(config: &AppConfig) -> Vec<PromptPreset> {
    let path = match &config.prompts_file {
        Some(path) => path.clone(),
        None => {
            let (xdg_config_home, home) = config_env_dirs();
            match app_config_path(
                APP_DIR,
                DEFAULT_PROMPTS_FILE,
                xdg_config_home.as_deref(),
                home.as_deref(),
            ) {
                Ok(path) if path.exists() => path,
                _ => return Vec::new(),
            }
        }
    };
    load_prompt_presets_from(&path)
}

pub fn load_prompt_presets_from(path: &Path) -> Vec<PromptPreset> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read prompt presets; using none");
            return Vec::new();
        }
    };
    match serde_json::from_str::<PromptPresetFile>(&contents) {
        Ok(file) => file.presets,
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to parse prompt presets; using none");
            Vec::new()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
