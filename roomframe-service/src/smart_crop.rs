//! Smart crop: frame a detected object at a chosen fill ratio and aspect ratio.
//!
//! The pipeline is locate, resolve, composite. Locating goes through the
//! [`ObjectLocator`] seam; resolving and compositing are pure functions shared by
//! every caller.

mod compositing;
mod geometry;
mod locator;

pub use compositing::composite_crop;
pub use geometry::{
    BoundingBox, CropRectangle, FillRatio, ImageDimensions, ResolvedCrop, TargetAspectRatio,
    resolve_crop,
};
pub use locator::{ObjectLocator, VisionLocator};

use image::RgbaImage;
use tracing::debug;

use crate::error::CropError;

/// Resolve a crop for `bbox` and composite it from `source`
pub fn crop_to_object(
    source: &RgbaImage,
    bbox: &BoundingBox,
    fill: FillRatio,
    aspect: TargetAspectRatio,
) -> Result<(ResolvedCrop, RgbaImage), CropError> {
    let resolved = resolve_crop(bbox, ImageDimensions::of(source), fill, aspect)?;
    let canvas = composite_crop(source, &resolved.rect)?;

    debug!(
        source = ?source.dimensions(),
        rect = ?resolved.rect,
        object_center = ?resolved.object_center_in_crop(),
        scale_factor = resolved.scale_factor,
        clamped = resolved.clamped,
        aspect = %aspect,
        fill = fill.percent(),
        "Cropped to object"
    );

    Ok((resolved, canvas))
}
