//! Canvas compositing for resolved crops.

use image::RgbaImage;
use image::imageops;
use tracing::trace;

use crate::error::CropError;

use super::geometry::{CropRectangle, ImageDimensions};

/// Portion of the source that falls inside a crop rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceWindow {
    /// Top-left of the window in source pixels
    pub src_left: u32,
    pub src_top: u32,
    pub width: u32,
    pub height: u32,
    /// Where the window lands on the output canvas
    pub dest_left: u32,
    pub dest_top: u32,
}

/// Intersect a crop rectangle with the source bounds.
///
/// Returns `None` when the rectangle does not overlap the image at all.
pub fn source_window(rect: &CropRectangle, dims: ImageDimensions) -> Option<SourceWindow> {
    let x0 = rect.left.max(0);
    let y0 = rect.top.max(0);
    let x1 = rect.right().min(dims.width as i64);
    let y1 = rect.bottom().min(dims.height as i64);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some(SourceWindow {
        src_left: x0 as u32,
        src_top: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
        dest_left: (x0 - rect.left) as u32,
        dest_top: (y0 - rect.top) as u32,
    })
}

/// Extract a crop rectangle from `source` onto a transparent canvas.
///
/// The canvas is always exactly `rect.width x rect.height`. Pixels inside the
/// source are copied verbatim (no blending); anything outside stays at alpha 0.
pub fn composite_crop(source: &RgbaImage, rect: &CropRectangle) -> Result<RgbaImage, CropError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(CropError::CompositingFailure {
            message: format!("cannot allocate a {}x{} canvas", rect.width, rect.height),
            source: None,
        });
    }

    let dims = ImageDimensions::of(source);
    if rect.fits_within(dims) {
        return Ok(imageops::crop_imm(
            source,
            rect.left as u32,
            rect.top as u32,
            rect.width,
            rect.height,
        )
        .to_image());
    }

    let mut canvas = RgbaImage::new(rect.width, rect.height);

    match source_window(rect, dims) {
        Some(window) => {
            let region = imageops::crop_imm(
                source,
                window.src_left,
                window.src_top,
                window.width,
                window.height,
            )
            .to_image();
            imageops::replace(
                &mut canvas,
                &region,
                window.dest_left as i64,
                window.dest_top as i64,
            );
            trace!(
                rect = ?rect,
                window = ?window,
                "Composited source window onto canvas"
            );
        }
        None => {
            trace!(rect = ?rect, "Crop lies entirely outside the source; canvas left transparent");
        }
    }

    Ok(canvas)
}
