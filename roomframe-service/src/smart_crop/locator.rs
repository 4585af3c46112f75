//! Object locator seam and the vision-model implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::ServiceResult;
use crate::ollama::{ChatMessage, OllamaClient, ResponseFormat};

/// Keys a model may wrap the coordinate array in
const BOX_KEYS: &[&str] = &["box_2d", "bbox", "bounding_box", "box"];

/// Finds a named object in an image.
///
/// `Ok(None)` means the object was not found or the answer was unusable;
/// `Err` is reserved for the locator backend itself failing.
#[async_trait]
pub trait ObjectLocator: Send + Sync {
    /// `image_base64` is a raw (unprefixed) base64 JPEG. On success returns
    /// `[ymin, xmin, ymax, xmax]` normalized to 0-1000, unvalidated.
    async fn locate(&self, image_base64: &str, object_name: &str)
    -> ServiceResult<Option<[f64; 4]>>;
}

/// Locator backed by a vision model behind an Ollama-compatible chat API
pub struct VisionLocator {
    client: Arc<OllamaClient>,
    runtime_config: Arc<RuntimeConfig>,
}

impl VisionLocator {
    pub fn new(client: Arc<OllamaClient>, runtime_config: Arc<RuntimeConfig>) -> Self {
        Self {
            client,
            runtime_config,
        }
    }
}

fn locate_prompt(object_name: &str) -> String {
    format!(
        "Find the {object} in this image. Respond with JSON only, in the form \
         {{\"box_2d\": [ymin, xmin, ymax, xmax]}}, with each coordinate normalized \
         to the range 0-1000 relative to the image height (y) and width (x). \
         If there is no {object} in the image, respond with {{\"box_2d\": null}}.",
        object = object_name
    )
}

#[async_trait]
impl ObjectLocator for VisionLocator {
    async fn locate(
        &self,
        image_base64: &str,
        object_name: &str,
    ) -> ServiceResult<Option<[f64; 4]>> {
        let vision = self.runtime_config.dynamic().vision.clone();

        let messages = vec![
            ChatMessage::system(
                "You are an object localization engine. You only ever answer with JSON.",
            ),
            ChatMessage::user_with_image(locate_prompt(object_name), image_base64.to_string()),
        ];

        let answer = self
            .client
            .generate_simple(&vision, messages, Some(ResponseFormat::Json))
            .await?;

        let parsed = parse_locator_answer(&answer);
        match parsed {
            Some(values) => debug!(object = %object_name, bbox = ?values, "Locator returned box"),
            None => info!(
                object = %object_name,
                answer = %answer.chars().take(200).collect::<String>(),
                "Locator answer contained no usable box"
            ),
        }

        Ok(parsed)
    }
}

/// Extract `[ymin, xmin, ymax, xmax]` from free-form model output.
///
/// Accepts a bare array, an object holding the array under a known key, a list
/// of such detections (the first one wins), or any of those embedded in prose
/// or a code fence. Embedded objects are tried before embedded arrays, and the
/// first one that yields a box wins. Anything else, including `null`, is
/// "not found".
pub fn parse_locator_answer(answer: &str) -> Option<[f64; 4]> {
    let trimmed = answer.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return box_from_value(&value);
    }

    embedded_box(trimmed, '{', '}').or_else(|| embedded_box(trimmed, '[', ']'))
}

/// First `open..close` span in `text` that parses as JSON and holds a box
fn embedded_box(text: &str, open: char, close: char) -> Option<[f64; 4]> {
    text.match_indices(open).find_map(|(start, _)| {
        text[start..]
            .match_indices(close)
            .find_map(|(offset, _)| {
                serde_json::from_str::<serde_json::Value>(&text[start..=start + offset]).ok()
            })
            .and_then(|value| box_from_value(&value))
    })
}

fn box_from_value(value: &serde_json::Value) -> Option<[f64; 4]> {
    match value {
        serde_json::Value::Array(items) => {
            if items.len() == 4 && items.iter().all(|v| v.is_number()) {
                let mut coords = [0.0; 4];
                for (slot, item) in coords.iter_mut().zip(items) {
                    *slot = item.as_f64()?;
                }
                Some(coords)
            } else {
                items.first().and_then(box_from_value)
            }
        }
        serde_json::Value::Object(map) => BOX_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(box_from_value),
        _ => None,
    }
}
