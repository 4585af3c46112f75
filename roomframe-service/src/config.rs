//! Service configuration.
//!
//! Split into static settings (server binding, request limits) that are read once
//! at startup, and dynamic settings (vision backend, crop and framing bounds) that
//! can be swapped at runtime through the settings API.

mod dynamic_config;
mod loader;
mod static_config;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{ServiceError, ServiceResult};

pub use dynamic_config::{DynamicConfig, FramingConfig, SmartCropConfig, VisionConfig};
pub use static_config::StaticConfig;

use loader::{load_dynamic_config, load_static_config};

// ==================== RuntimeConfig (combines static + dynamic) ====================

/// Runtime configuration manager
/// Combines static config (startup-only) with dynamic config (hot-reloadable via ArcSwap)
pub struct RuntimeConfig {
    /// Static configuration (never changes after startup)
    pub static_config: StaticConfig,
    /// File/env values that overrides are applied on top of
    base_dynamic: DynamicConfig,
    /// Settings changed through the API, keyed by dotted setting name
    overrides: DashMap<String, serde_json::Value>,
    /// Dynamic configuration (can be hot-reloaded)
    dynamic: ArcSwap<DynamicConfig>,
    /// Held across update-rebuild-store so the override map and the live config agree
    update_lock: Mutex<()>,
}

impl RuntimeConfig {
    /// Load config from file and environment
    pub fn load() -> ServiceResult<Self> {
        let static_config = load_static_config()?;
        let dynamic = load_dynamic_config()?;
        Ok(Self::from_parts(static_config, dynamic))
    }

    pub fn from_parts(static_config: StaticConfig, dynamic: DynamicConfig) -> Self {
        Self {
            static_config,
            base_dynamic: dynamic.clone(),
            overrides: DashMap::new(),
            dynamic: ArcSwap::from_pointee(dynamic),
            update_lock: Mutex::new(()),
        }
    }

    /// Get current dynamic config snapshot (lock-free read)
    pub fn dynamic(&self) -> arc_swap::Guard<Arc<DynamicConfig>> {
        self.dynamic.load()
    }

    /// Keys that currently differ from the file/env defaults
    pub fn overridden_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.overrides.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Record setting overrides and swap in the rebuilt dynamic config.
    /// A `null` value drops the override so the key reverts to its default.
    /// Nothing changes if the resulting config has inverted bounds.
    pub fn apply_overrides(
        &self,
        updates: HashMap<String, serde_json::Value>,
    ) -> ServiceResult<()> {
        let _guard = self.update_lock.lock().map_err(|_| ServiceError::Internal {
            message: "settings lock poisoned".to_string(),
        })?;

        let mut merged: HashMap<String, serde_json::Value> = self
            .overrides
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        for (key, value) in &updates {
            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }

        let mut dynamic = self.base_dynamic.clone();
        dynamic.merge_overrides(&merged);
        dynamic
            .validate_bounds()
            .map_err(|message| ServiceError::InvalidRequest { message })?;

        for (key, value) in updates {
            if value.is_null() {
                self.overrides.remove(&key);
            } else {
                self.overrides.insert(key, value);
            }
        }
        self.dynamic.store(Arc::new(dynamic));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_swap_and_revert() {
        let runtime = RuntimeConfig::from_parts(StaticConfig::default(), DynamicConfig::default());

        let mut updates = HashMap::new();
        updates.insert("framing.min_zoom".to_string(), serde_json::json!(25));
        runtime.apply_overrides(updates).unwrap();

        assert_eq!(runtime.dynamic().framing.min_zoom, 25);
        assert_eq!(runtime.overridden_keys(), vec!["framing.min_zoom".to_string()]);

        let mut revert = HashMap::new();
        revert.insert("framing.min_zoom".to_string(), serde_json::Value::Null);
        runtime.apply_overrides(revert).unwrap();

        assert_eq!(runtime.dynamic().framing.min_zoom, 50);
        assert!(runtime.overridden_keys().is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_across_swap() {
        let runtime = RuntimeConfig::from_parts(StaticConfig::default(), DynamicConfig::default());
        let before = runtime.dynamic();

        let mut updates = HashMap::new();
        updates.insert("vision.model".to_string(), serde_json::json!("llava"));
        runtime.apply_overrides(updates).unwrap();

        assert_eq!(before.vision.model, "qwen2.5vl");
        assert_eq!(runtime.dynamic().vision.model, "llava");
    }

    #[test]
    fn test_inverted_bounds_leave_config_untouched() {
        let runtime = RuntimeConfig::from_parts(StaticConfig::default(), DynamicConfig::default());

        let mut updates = HashMap::new();
        updates.insert("framing.min_zoom".to_string(), serde_json::json!(250));
        let err = runtime.apply_overrides(updates).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));
        assert_eq!(runtime.dynamic().framing.min_zoom, 50);
        assert!(runtime.overridden_keys().is_empty());

        let mut updates = HashMap::new();
        updates.insert("smart_crop.min_fill_ratio".to_string(), serde_json::json!(60));
        updates.insert("smart_crop.max_fill_ratio".to_string(), serde_json::json!(40));
        assert!(runtime.apply_overrides(updates).is_err());
        assert_eq!(runtime.dynamic().smart_crop.max_fill_ratio, 100.0);
    }

    #[test]
    fn test_concurrent_updates_are_all_applied() {
        for round in 0..500 {
            let runtime = Arc::new(RuntimeConfig::from_parts(
                StaticConfig::default(),
                DynamicConfig::default(),
            ));

            let handles: Vec<_> = [("framing.min_zoom", 60), ("framing.max_zoom", 180)]
                .into_iter()
                .map(|(key, value)| {
                    let runtime = runtime.clone();
                    std::thread::spawn(move || {
                        let mut updates = HashMap::new();
                        updates.insert(key.to_string(), serde_json::json!(value));
                        runtime.apply_overrides(updates).unwrap();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let config = runtime.dynamic();
            assert_eq!(
                (config.framing.min_zoom, config.framing.max_zoom),
                (60, 180),
                "round {round}: overridden={:?}",
                runtime.overridden_keys()
            );
        }
    }
}
