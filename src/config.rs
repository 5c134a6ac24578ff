use std::path::{Path, PathBuf};

use serde::{
    Deserialize,
    Serialize
};

use crate::{
    error::{EngineError, Result},
    game::color::Rgb,
    DEFAULT_ART_DIR,
    DEFAULT_WINDOW_HEIGHT,
    DEFAULT_WINDOW_TITLE,
    DEFAULT_WINDOW_WIDTH
};

/// Window and asset settings. Missing fields in a config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub art_dir: PathBuf,
    pub clear_color: Rgb,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            art_dir: PathBuf::from(DEFAULT_ART_DIR),
            clear_color: Rgb::from_u8(26, 26, 26),
            log_filter: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|source| EngineError::Config {
            path: path.to_path_buf(),
            source
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(EngineError::invalid_argument(format!(
                "window size must be non-zero, got {}x{}", self.window_width, self.window_height
            )));
        }
        Ok(())
    }
}
