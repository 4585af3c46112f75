//! Request and outcome types for the image pipelines.

use serde::{Deserialize, Serialize};

use crate::framing::{CameraAngle, NEUTRAL_ZOOM};
use crate::smart_crop::{BoundingBox, CropRectangle, TargetAspectRatio};

/// Smart crop parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SmartCropRequest {
    /// Base64 image, raw or as a data URL
    pub image: String,
    /// What to frame, e.g. "sofa"
    pub object_name: String,
    /// Percentage of the output width the object should span
    pub fill_ratio: f64,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: TargetAspectRatio,
}

fn default_aspect_ratio() -> TargetAspectRatio {
    TargetAspectRatio::Original
}

/// Smart crop result
#[derive(Debug, Clone, Serialize)]
pub struct SmartCropOutcome {
    /// PNG data URL with transparent padding where the crop leaves the source
    pub image: String,
    pub width: u32,
    pub height: u32,
    /// Crop rectangle in source pixels
    pub crop: CropRectangle,
    /// Detection the crop was built from (0-1000)
    pub bounding_box: BoundingBox,
    /// True when the crop was shrunk to fit and the fill ratio is not exact
    pub scaled_down: bool,
}

/// Camera framing parameters
#[derive(Debug, Clone, Deserialize)]
pub struct FramingRequest {
    pub image: String,
    #[serde(default)]
    pub angle: CameraAngle,
    #[serde(default = "default_zoom")]
    pub zoom: u32,
}

fn default_zoom() -> u32 {
    NEUTRAL_ZOOM
}

/// Camera framing result
#[derive(Debug, Clone, Serialize)]
pub struct FramingOutcome {
    /// PNG data URL, same dimensions as the input
    pub image: String,
    pub width: u32,
    pub height: u32,
    /// Text to pass along to the synthesis model
    pub instruction: String,
}
