//! Dynamic configuration that can be updated at runtime via API.
//! In-memory overrides take precedence over config file/env defaults.

mod defaults;
mod keys;
mod merging;
mod schemas;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use schemas::{FramingConfig, SmartCropConfig, VisionConfig};

use defaults::{default_framing, default_smart_crop, default_vision};

/// Dynamic configuration that can be updated at runtime via API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicConfig {
    #[serde(default = "default_vision")]
    pub vision: VisionConfig,

    #[serde(default = "default_smart_crop")]
    pub smart_crop: SmartCropConfig,

    #[serde(default = "default_framing")]
    pub framing: FramingConfig,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            vision: default_vision(),
            smart_crop: default_smart_crop(),
            framing: default_framing(),
        }
    }
}

impl DynamicConfig {
    /// Get all valid setting keys
    pub fn valid_keys() -> HashSet<&'static str> {
        keys::valid_keys()
    }

    /// Reject min/max pairs that would make every request fail
    pub fn validate_bounds(&self) -> Result<(), String> {
        let crop = &self.smart_crop;
        if crop
            .min_fill_ratio
            .partial_cmp(&crop.max_fill_ratio)
            .is_none_or(|order| order.is_gt())
        {
            return Err(format!(
                "smart_crop.min_fill_ratio ({}) must not exceed smart_crop.max_fill_ratio ({})",
                crop.min_fill_ratio, crop.max_fill_ratio
            ));
        }

        let framing = &self.framing;
        if framing.min_zoom > framing.max_zoom {
            return Err(format!(
                "framing.min_zoom ({}) must not exceed framing.max_zoom ({})",
                framing.min_zoom, framing.max_zoom
            ));
        }

        Ok(())
    }
}
