//! Base64 image payloads: decoding uploads and encoding results.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::{CropError, ServiceError, ServiceResult};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
const DETECTION_JPEG_QUALITY: u8 = 85;

/// Strip an optional `data:<mime>;base64,` prefix
pub fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, data)) = trimmed.split_once(',') {
            return data;
        }
    }
    trimmed
}

/// Decode an uploaded image given as raw base64 or a data URL
pub fn decode_image_payload(payload: &str) -> ServiceResult<DynamicImage> {
    let encoded = strip_data_url(payload);
    if encoded.is_empty() {
        return Err(ServiceError::invalid_request("image payload is empty"));
    }

    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ServiceError::invalid_request(format!("image is not valid base64: {}", e)))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| CropError::compositing("Failed to decode source image", e))?;

    Ok(image)
}

/// Encode an RGBA canvas as a PNG data URL (alpha preserved)
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, CropError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CropError::compositing("Failed to encode PNG", e))?;

    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&buffer)))
}

/// Prepare the copy of an image sent to the object locator: downscaled so the
/// longest side is at most `max_dimension`, flattened to RGB, JPEG, base64.
pub fn encode_detection_jpeg(image: &DynamicImage, max_dimension: u32) -> Result<String, CropError> {
    let longest = image.width().max(image.height());
    let resized;
    let source = if max_dimension > 0 && longest > max_dimension {
        resized = image.resize(max_dimension, max_dimension, FilterType::Triangle);
        &resized
    } else {
        image
    };

    let rgb = source.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, DETECTION_JPEG_QUALITY)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CropError::compositing("Failed to encode detection JPEG", e))?;

    Ok(STANDARD.encode(&buffer))
}
