mod framing;
mod requests;
mod smart_crop;

pub use requests::{FramingOutcome, FramingRequest, SmartCropOutcome, SmartCropRequest};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::ollama::OllamaClient;
use crate::smart_crop::{ObjectLocator, VisionLocator};

/// Main service coordinator
pub struct RoomframeService {
    pub runtime_config: Arc<RuntimeConfig>,
    pub vision: Arc<OllamaClient>,
    locator: Arc<dyn ObjectLocator>,
}

impl RoomframeService {
    /// Create a service that locates objects with the configured vision model
    pub fn new(runtime_config: Arc<RuntimeConfig>) -> ServiceResult<Self> {
        info!("Initializing Roomframe service");

        let vision = Arc::new(OllamaClient::new()?);
        let locator = Arc::new(VisionLocator::new(vision.clone(), runtime_config.clone()));

        Ok(Self::with_locator(runtime_config, vision, locator))
    }

    /// Create a service with an explicit locator
    pub fn with_locator(
        runtime_config: Arc<RuntimeConfig>,
        vision: Arc<OllamaClient>,
        locator: Arc<dyn ObjectLocator>,
    ) -> Self {
        Self {
            runtime_config,
            vision,
            locator,
        }
    }

    /// Whether the vision backend answers right now
    pub async fn vision_available(&self) -> bool {
        let config = self.runtime_config.dynamic().vision.clone();
        self.vision.health_check(&config).await
    }

    /// Log vision backend availability (startup only, never fatal)
    pub async fn check_vision_backend(&self) {
        let config = self.runtime_config.dynamic().vision.clone();
        if self.vision.health_check(&config).await {
            info!(url = %config.base_url, model = %config.model, "Vision backend is available");
        } else {
            warn!(
                url = %config.base_url,
                "Vision backend is not available; smart crop requests will fail until it is"
            );
        }
    }

    /// Apply setting overrides (keys must already be validated)
    pub fn update_settings(
        &self,
        updates: HashMap<String, serde_json::Value>,
    ) -> ServiceResult<()> {
        let mut keys: Vec<String> = updates.keys().cloned().collect();
        keys.sort();

        self.runtime_config.apply_overrides(updates)?;
        info!(keys = ?keys, "Settings updated");
        Ok(())
    }
}

/// Run CPU-bound image work on the blocking pool
async fn run_blocking<T, F>(task: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ServiceError::Internal {
            message: format!("image task failed: {}", e),
        })?
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::RoomframeService;
    use crate::config::{DynamicConfig, RuntimeConfig, StaticConfig};
    use crate::error::{ServiceError, ServiceResult, VisionError};
    use crate::image_data::encode_png_data_url;
    use crate::ollama::OllamaClient;
    use crate::smart_crop::ObjectLocator;

    /// Locator returning a canned answer and counting calls
    pub struct FakeLocator {
        answer: Option<[f64; 4]>,
        unavailable: bool,
        pub calls: AtomicUsize,
    }

    impl FakeLocator {
        pub fn found(bbox: [f64; 4]) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(bbox),
                unavailable: false,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn not_found() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                unavailable: false,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn unavailable() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                unavailable: true,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectLocator for FakeLocator {
        async fn locate(
            &self,
            image_base64: &str,
            _object_name: &str,
        ) -> ServiceResult<Option<[f64; 4]>> {
            assert!(!image_base64.starts_with("data:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(ServiceError::Vision(VisionError::Request {
                    status: 503,
                    message: "model loading".to_string(),
                }));
            }
            Ok(self.answer)
        }
    }

    pub fn service_with(locator: Arc<FakeLocator>) -> RoomframeService {
        // Nothing listens on the discard port, so health checks fail fast
        let mut dynamic = DynamicConfig::default();
        dynamic.vision.base_url = "http://127.0.0.1:9".to_string();
        dynamic.vision.request_timeout_secs = 1;

        let runtime_config = Arc::new(RuntimeConfig::from_parts(StaticConfig::default(), dynamic));
        let vision = Arc::new(OllamaClient::new().unwrap());
        RoomframeService::with_locator(runtime_config, vision, locator)
    }

    /// Beige room with a red object covering `bbox` (0-1000 coordinates)
    pub fn room_data_url(width: u32, height: u32, bbox: [f64; 4]) -> String {
        let [ymin, xmin, ymax, xmax] = bbox;
        let x0 = (xmin / 1000.0 * width as f64) as u32;
        let x1 = (xmax / 1000.0 * width as f64) as u32;
        let y0 = (ymin / 1000.0 * height as f64) as u32;
        let y1 = (ymax / 1000.0 * height as f64) as u32;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgba([200, 30, 30, 255])
            } else {
                Rgba([240, 235, 220, 255])
            }
        });
        encode_png_data_url(&image).unwrap()
    }
}
