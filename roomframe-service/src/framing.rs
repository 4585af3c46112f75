//! Camera framing preprocessor.
//!
//! Prepares a room photo for the synthesis model by zooming around the image
//! center and producing an instruction describing the requested camera angle.
//! The angle is only described, never rendered: no perspective warp happens here,
//! the synthesis model is expected to re-project the room itself.
//!
//! Zooming in crops the center and scales it back up. Zooming out shrinks the
//! photo onto a padded canvas, leaving a border for the model to outpaint. The
//! output always has the input's dimensions.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

/// Zoom percentage that leaves the image untouched
pub const NEUTRAL_ZOOM: u32 = 100;

/// Camera angle requested for the redesigned room
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum CameraAngle {
    Front,
    Side,
    Top,
    /// Keep the photo's own viewpoint
    #[default]
    Original,
}

impl CameraAngle {
    /// Phrase for the synthesis model, `None` when the viewpoint is kept
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            CameraAngle::Front => Some(
                "Show the room from a straight-on front view at eye level, \
                 with the camera facing the main wall.",
            ),
            CameraAngle::Side => Some(
                "Show the room from a side angle, with the camera turned about \
                 45 degrees toward one corner.",
            ),
            CameraAngle::Top => Some(
                "Show the room from an elevated high angle looking down into the space.",
            ),
            CameraAngle::Original => None,
        }
    }
}

/// Output of the framing preprocessor
#[derive(Debug, Clone)]
pub struct FramedImage {
    pub image: RgbaImage,
    pub instruction: String,
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
pub fn parse_pad_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Zoom around the image center, keeping the output dimensions.
///
/// Above 100 the centered `100/zoom` region is scaled back up; below 100 the
/// image is shrunk to `zoom/100` and centered on a `pad` canvas.
pub fn apply_zoom(image: &RgbaImage, zoom: u32, pad: Rgba<u8>) -> RgbaImage {
    let (width, height) = image.dimensions();
    if zoom == NEUTRAL_ZOOM || width == 0 || height == 0 {
        return image.clone();
    }

    if zoom > NEUTRAL_ZOOM {
        let crop_w = scale_dim(width, NEUTRAL_ZOOM, zoom);
        let crop_h = scale_dim(height, NEUTRAL_ZOOM, zoom);
        let left = (width - crop_w) / 2;
        let top = (height - crop_h) / 2;

        let center = imageops::crop_imm(image, left, top, crop_w, crop_h).to_image();
        debug!(zoom, crop = ?(left, top, crop_w, crop_h), "Zooming in");
        imageops::resize(&center, width, height, FilterType::Lanczos3)
    } else {
        let inner_w = scale_dim(width, zoom, NEUTRAL_ZOOM);
        let inner_h = scale_dim(height, zoom, NEUTRAL_ZOOM);
        let shrunk = imageops::resize(image, inner_w, inner_h, FilterType::Lanczos3);

        let mut canvas = RgbaImage::from_pixel(width, height, pad);
        let left = (width - inner_w) / 2;
        let top = (height - inner_h) / 2;
        imageops::replace(&mut canvas, &shrunk, left as i64, top as i64);
        debug!(zoom, inner = ?(left, top, inner_w, inner_h), "Zooming out onto padded canvas");
        canvas
    }
}

/// `value * num / den`, floored, at least 1 and at most `value`
fn scale_dim(value: u32, num: u32, den: u32) -> u32 {
    let scaled = value as u64 * num as u64 / den.max(1) as u64;
    (scaled as u32).clamp(1, value)
}

/// Instruction text for the synthesis model
pub fn framing_instruction(angle: CameraAngle, zoom: u32) -> String {
    let zoom_phrase = match zoom.cmp(&NEUTRAL_ZOOM) {
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(format!(
            "Frame the shot tighter, as if zoomed in to {}%, keeping the center of the room in focus.",
            zoom
        )),
        std::cmp::Ordering::Less => Some(format!(
            "Frame the shot wider, as if zoomed out to {}%. The photo sits inside a solid border; \
             extend the room naturally into the border so the whole frame is filled.",
            zoom
        )),
    };

    angle
        .instruction()
        .map(str::to_string)
        .into_iter()
        .chain(zoom_phrase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply zoom and build the instruction for one framing request
pub fn frame_image(image: &RgbaImage, angle: CameraAngle, zoom: u32, pad: Rgba<u8>) -> FramedImage {
    FramedImage {
        image: apply_zoom(image, zoom, pad),
        instruction: framing_instruction(angle, zoom),
    }
}
