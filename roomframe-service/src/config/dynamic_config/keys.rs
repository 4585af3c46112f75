//! Valid setting keys for DynamicConfig.

use std::collections::HashSet;

/// All valid setting keys for DynamicConfig
pub const VALID_SETTING_KEYS: &[&str] = &[
    "vision.base_url",
    "vision.model",
    "vision.temperature",
    "vision.request_timeout_secs",
    "vision.detection_max_dimension",
    "smart_crop.min_fill_ratio",
    "smart_crop.max_fill_ratio",
    "framing.pad_color",
    "framing.min_zoom",
    "framing.max_zoom",
];

/// Get all valid setting keys as a HashSet
pub fn valid_keys() -> HashSet<&'static str> {
    VALID_SETTING_KEYS.iter().copied().collect()
}
