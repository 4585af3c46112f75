//! Default value functions for DynamicConfig.

use super::schemas::{FramingConfig, SmartCropConfig, VisionConfig};

// ==================== Top-level Section Defaults ====================

pub(crate) fn default_vision() -> VisionConfig {
    VisionConfig {
        base_url: default_vision_url(),
        model: default_vision_model(),
        temperature: default_temperature(),
        request_timeout_secs: default_request_timeout_secs(),
        detection_max_dimension: default_detection_max_dimension(),
    }
}

pub(crate) fn default_smart_crop() -> SmartCropConfig {
    SmartCropConfig {
        min_fill_ratio: default_min_fill_ratio(),
        max_fill_ratio: default_max_fill_ratio(),
    }
}

pub(crate) fn default_framing() -> FramingConfig {
    FramingConfig {
        pad_color: default_pad_color(),
        min_zoom: default_min_zoom(),
        max_zoom: default_max_zoom(),
    }
}

// ==================== Vision Defaults ====================

pub(crate) fn default_vision_url() -> String {
    "http://localhost:11434".to_string()
}

pub(crate) fn default_vision_model() -> String {
    "qwen2.5vl".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.1
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_detection_max_dimension() -> u32 {
    1024
}

// ==================== Smart Crop Defaults ====================

pub(crate) fn default_min_fill_ratio() -> f64 {
    10.0
}

pub(crate) fn default_max_fill_ratio() -> f64 {
    100.0
}

// ==================== Framing Defaults ====================

pub(crate) fn default_pad_color() -> String {
    "#ffffff".to_string()
}

pub(crate) fn default_min_zoom() -> u32 {
    50
}

pub(crate) fn default_max_zoom() -> u32 {
    200
}
