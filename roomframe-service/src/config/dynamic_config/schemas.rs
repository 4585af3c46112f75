//! Configuration struct definitions for DynamicConfig sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vision model configuration (object locator backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Base URL of an Ollama-compatible chat API
    #[serde(default = "super::defaults::default_vision_url")]
    pub base_url: String,

    /// Vision-capable model used for object localization (e.g., qwen2.5vl, llava)
    #[serde(default = "super::defaults::default_vision_model")]
    pub model: String,

    #[serde(default = "super::defaults::default_temperature")]
    pub temperature: f32,

    #[serde(default = "super::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Longest side, in pixels, of the copy sent to the locator
    #[serde(default = "super::defaults::default_detection_max_dimension")]
    pub detection_max_dimension: u32,
}

impl VisionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Smart-crop request bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartCropConfig {
    #[serde(default = "super::defaults::default_min_fill_ratio")]
    pub min_fill_ratio: f64,

    #[serde(default = "super::defaults::default_max_fill_ratio")]
    pub max_fill_ratio: f64,
}

/// Camera framing preprocessor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramingConfig {
    /// Fill color for the border added when zooming out (`#rrggbb` or `#rrggbbaa`)
    #[serde(default = "super::defaults::default_pad_color")]
    pub pad_color: String,

    #[serde(default = "super::defaults::default_min_zoom")]
    pub min_zoom: u32,

    #[serde(default = "super::defaults::default_max_zoom")]
    pub max_zoom: u32,
}
