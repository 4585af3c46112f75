//! Key-value conversion and override merging logic for DynamicConfig.

use std::collections::HashMap;

use super::DynamicConfig;

impl DynamicConfig {
    /// Convert config to key-value map for API response
    pub fn to_key_value_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        // Vision settings
        map.insert(
            "vision.base_url".to_string(),
            serde_json::Value::String(self.vision.base_url.clone()),
        );
        map.insert(
            "vision.model".to_string(),
            serde_json::Value::String(self.vision.model.clone()),
        );
        map.insert(
            "vision.temperature".to_string(),
            serde_json::json!(self.vision.temperature),
        );
        map.insert(
            "vision.request_timeout_secs".to_string(),
            serde_json::json!(self.vision.request_timeout_secs),
        );
        map.insert(
            "vision.detection_max_dimension".to_string(),
            serde_json::json!(self.vision.detection_max_dimension),
        );

        // Smart crop settings
        map.insert(
            "smart_crop.min_fill_ratio".to_string(),
            serde_json::json!(self.smart_crop.min_fill_ratio),
        );
        map.insert(
            "smart_crop.max_fill_ratio".to_string(),
            serde_json::json!(self.smart_crop.max_fill_ratio),
        );

        // Framing settings
        map.insert(
            "framing.pad_color".to_string(),
            serde_json::Value::String(self.framing.pad_color.clone()),
        );
        map.insert(
            "framing.min_zoom".to_string(),
            serde_json::json!(self.framing.min_zoom),
        );
        map.insert(
            "framing.max_zoom".to_string(),
            serde_json::json!(self.framing.max_zoom),
        );

        map
    }

    /// Merge runtime overrides into this config.
    /// Values of the wrong JSON type are ignored and the default is kept.
    pub fn merge_overrides(&mut self, overrides: &HashMap<String, serde_json::Value>) {
        for (key, value) in overrides {
            self.apply_setting(key, value);
        }
    }

    /// Apply a single setting value
    fn apply_setting(&mut self, key: &str, value: &serde_json::Value) {
        match key {
            // Vision settings
            "vision.base_url" => {
                if let Some(v) = value.as_str() {
                    self.vision.base_url = v.trim_end_matches('/').to_string();
                }
            }
            "vision.model" => {
                if let Some(v) = value.as_str() {
                    self.vision.model = v.to_string();
                }
            }
            "vision.temperature" => {
                if let Some(v) = value.as_f64() {
                    self.vision.temperature = v as f32;
                }
            }
            "vision.request_timeout_secs" => {
                if let Some(v) = value.as_u64() {
                    self.vision.request_timeout_secs = v;
                }
            }
            "vision.detection_max_dimension" => {
                if let Some(v) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    self.vision.detection_max_dimension = v;
                }
            }

            // Smart crop settings
            "smart_crop.min_fill_ratio" => {
                if let Some(v) = value.as_f64() {
                    self.smart_crop.min_fill_ratio = v;
                }
            }
            "smart_crop.max_fill_ratio" => {
                if let Some(v) = value.as_f64() {
                    self.smart_crop.max_fill_ratio = v;
                }
            }

            // Framing settings
            "framing.pad_color" => {
                if let Some(v) = value.as_str() {
                    self.framing.pad_color = v.to_string();
                }
            }
            "framing.min_zoom" => {
                if let Some(v) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    self.framing.min_zoom = v;
                }
            }
            "framing.max_zoom" => {
                if let Some(v) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    self.framing.max_zoom = v;
                }
            }

            _ => {
                tracing::warn!(key = %key, "Ignoring unknown setting key");
            }
        }
    }
}
