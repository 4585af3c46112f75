//! Geometry resolution: normalized detection box to pixel-space crop rectangle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::trace;

use crate::error::CropError;

/// Upper bound of the locator's normalized coordinate space
pub const NORMALIZED_EXTENT: f64 = 1000.0;

/// Slack added before flooring so `499.99999` from float error still floors to 500
const FLOOR_EPSILON: f64 = 1e-6;

/// Object location as reported by the locator, `[ymin, xmin, ymax, xmax]` in 0-1000
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl BoundingBox {
    /// Build a box from the locator's `[ymin, xmin, ymax, xmax]` array.
    ///
    /// Rejects non-finite values, values outside `[0, 1000]`, and boxes with
    /// zero or negative extent on either axis.
    pub fn from_locator(values: [f64; 4]) -> Result<Self, CropError> {
        let [ymin, xmin, ymax, xmax] = values;
        let bbox = Self {
            ymin,
            xmin,
            ymax,
            xmax,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    pub fn validate(&self) -> Result<(), CropError> {
        let coords = [self.ymin, self.xmin, self.ymax, self.xmax];

        if coords.iter().any(|v| !v.is_finite()) {
            return Err(CropError::invalid_detection(format!(
                "bounding box has non-finite coordinates: {:?}",
                coords
            )));
        }

        if coords.iter().any(|&v| !(0.0..=NORMALIZED_EXTENT).contains(&v)) {
            return Err(CropError::invalid_detection(format!(
                "bounding box {:?} is outside the 0-1000 range",
                coords
            )));
        }

        if self.xmax <= self.xmin || self.ymax <= self.ymin {
            return Err(CropError::invalid_detection(format!(
                "bounding box {:?} has zero or negative extent",
                coords
            )));
        }

        Ok(())
    }
}

/// Source image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height)
    }
}

/// Share of the output width the detected object should occupy, as a percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRatio(f64);

impl FillRatio {
    /// Returns `None` unless `percent` is finite and in `(0, 100]`
    pub fn new(percent: f64) -> Option<Self> {
        (percent.is_finite() && percent > 0.0 && percent <= 100.0).then_some(Self(percent))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }
}

/// Output aspect ratio (width:height)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum TargetAspectRatio {
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape16x9,
    #[serde(rename = "4:5")]
    #[strum(serialize = "4:5")]
    Portrait4x5,
    /// Follow the source image's own aspect ratio
    #[serde(rename = "Original")]
    #[strum(serialize = "Original")]
    Original,
}

impl TargetAspectRatio {
    /// Output height per unit of output width
    pub fn height_per_width(&self, source: ImageDimensions) -> f64 {
        match self {
            TargetAspectRatio::Square => 1.0,
            TargetAspectRatio::Portrait9x16 => 16.0 / 9.0,
            TargetAspectRatio::Landscape16x9 => 9.0 / 16.0,
            TargetAspectRatio::Portrait4x5 => 5.0 / 4.0,
            TargetAspectRatio::Original => source.height as f64 / source.width as f64,
        }
    }
}

/// Crop in source pixel space. The corner is signed so a rectangle that
/// extends past the image edge can still be described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRectangle {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRectangle {
    pub fn right(&self) -> i64 {
        self.left + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height as i64
    }

    pub fn fits_within(&self, dims: ImageDimensions) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= dims.width as i64
            && self.bottom() <= dims.height as i64
    }
}

/// Result of resolving a detection into a crop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCrop {
    pub rect: CropRectangle,
    /// Object center in source pixels
    pub object_center: (f64, f64),
    /// Uniform factor applied so the crop fits the source (1.0 when untouched)
    pub scale_factor: f64,
    /// Whether the corner had to be moved to keep the crop inside the image
    pub clamped: bool,
}

impl ResolvedCrop {
    pub fn scaled_down(&self) -> bool {
        self.scale_factor < 1.0
    }

    /// Object center relative to the crop's top-left corner
    pub fn object_center_in_crop(&self) -> (f64, f64) {
        (
            self.object_center.0 - self.rect.left as f64,
            self.object_center.1 - self.rect.top as f64,
        )
    }
}

fn floor_px(value: f64) -> u32 {
    (value + FLOOR_EPSILON).floor().max(0.0) as u32
}

/// Resolve a detection into a crop rectangle.
///
/// The crop is sized so the object spans `fill` of the output width, given the
/// requested aspect ratio, then uniformly scaled down if it would exceed the
/// source. Aspect ratio is preserved exactly; the fill ratio degrades instead.
/// The corner is centered on the object and clamped into the image.
pub fn resolve_crop(
    bbox: &BoundingBox,
    dims: ImageDimensions,
    fill: FillRatio,
    aspect: TargetAspectRatio,
) -> Result<ResolvedCrop, CropError> {
    bbox.validate()?;

    if dims.width == 0 || dims.height == 0 {
        return Err(CropError::CompositingFailure {
            message: format!("source image has zero area ({}x{})", dims.width, dims.height),
            source: None,
        });
    }

    let img_w = dims.width as f64;
    let img_h = dims.height as f64;

    let obj_w = (bbox.xmax - bbox.xmin) / NORMALIZED_EXTENT * img_w;
    let obj_h = (bbox.ymax - bbox.ymin) / NORMALIZED_EXTENT * img_h;
    if obj_w <= 0.0 || obj_h <= 0.0 {
        return Err(CropError::invalid_detection(format!(
            "object resolves to {:.2}x{:.2} pixels",
            obj_w, obj_h
        )));
    }

    let center_x = (bbox.xmin + bbox.xmax) / (2.0 * NORMALIZED_EXTENT) * img_w;
    let center_y = (bbox.ymin + bbox.ymax) / (2.0 * NORMALIZED_EXTENT) * img_h;

    let ideal_w = obj_w / fill.fraction();
    let ideal_h = ideal_w * aspect.height_per_width(dims);

    let scale_factor = 1.0_f64.min(img_w / ideal_w).min(img_h / ideal_h);

    let width = floor_px(ideal_w * scale_factor).min(dims.width);
    let height = floor_px(ideal_h * scale_factor).min(dims.height);
    if width == 0 || height == 0 {
        return Err(CropError::invalid_detection(format!(
            "crop resolves to {}x{} pixels",
            width, height
        )));
    }

    let centered_left = (center_x - width as f64 / 2.0).floor() as i64;
    let centered_top = (center_y - height as f64 / 2.0).floor() as i64;

    let max_left = (dims.width - width) as i64;
    let max_top = (dims.height - height) as i64;
    let left = centered_left.clamp(0, max_left);
    let top = centered_top.clamp(0, max_top);

    let resolved = ResolvedCrop {
        rect: CropRectangle {
            left,
            top,
            width,
            height,
        },
        object_center: (center_x, center_y),
        scale_factor,
        clamped: left != centered_left || top != centered_top,
    };

    trace!(
        object = format!("{:.1}x{:.1}", obj_w, obj_h),
        center = format!("({:.1}, {:.1})", center_x, center_y),
        ideal = format!("{:.1}x{:.1}", ideal_w, ideal_h),
        scale_factor = scale_factor,
        rect = ?resolved.rect,
        clamped = resolved.clamped,
        "Resolved crop geometry"
    );

    Ok(resolved)
}
