use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::error::ConfigError;
use crate::types::{Background, Dimensions};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
    pub initial: f64,
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        ZoomConfig { initial: 0.4, step: 0.1, min: 0.1, max: 1.0 }
    }
}

/// Editor settings. Every field has a default, so `{}` is a valid config.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of snapshots kept on the undo stack.
    pub history_limit: usize,
    /// Offset applied on each paste, in both axes.
    pub paste_offset: f64,
    pub default_font: String,
    pub default_font_size: f64,
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub zoom: ZoomConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            history_limit: 25,
            paste_offset: 10.0,
            default_font: "Poppins".to_string(),
            default_font_size: 32.0,
            width: 1080.0,
            height: 1080.0,
            background: "#FFFFFF".to_string(),
            zoom: ZoomConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!("loaded editor config: history_limit={}", config.history_limit);
        Ok(config)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions { width: self.width, height: self.height }
    }

    pub fn background(&self) -> Background {
        Background::Color(self.background.clone())
    }
}
