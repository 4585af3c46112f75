//! Camera framing pipeline.

use image::Rgba;
use tracing::{info, warn};

use crate::config::FramingConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::framing::{frame_image, parse_pad_color};
use crate::image_data::{decode_image_payload, encode_png_data_url};

use super::requests::{FramingOutcome, FramingRequest};
use super::{RoomframeService, run_blocking};

const FALLBACK_PAD: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn validate_zoom(zoom: u32, bounds: &FramingConfig) -> ServiceResult<u32> {
    if zoom < bounds.min_zoom || zoom > bounds.max_zoom {
        return Err(ServiceError::invalid_request(format!(
            "zoom must be between {} and {}, got {}",
            bounds.min_zoom, bounds.max_zoom, zoom
        )));
    }
    Ok(zoom)
}

fn pad_color(config: &FramingConfig) -> Rgba<u8> {
    parse_pad_color(&config.pad_color).unwrap_or_else(|| {
        warn!(pad_color = %config.pad_color, "Unparsable framing.pad_color, using white");
        FALLBACK_PAD
    })
}

impl RoomframeService {
    /// Zoom the image around its center and describe the requested angle
    pub async fn frame(&self, request: FramingRequest) -> ServiceResult<FramingOutcome> {
        let FramingRequest { image, angle, zoom } = request;

        let (zoom, pad) = {
            let config = self.runtime_config.dynamic();
            (validate_zoom(zoom, &config.framing)?, pad_color(&config.framing))
        };

        let outcome = run_blocking(move || {
            let source = decode_image_payload(&image)?.to_rgba8();
            let framed = frame_image(&source, angle, zoom, pad);
            Ok(FramingOutcome {
                image: encode_png_data_url(&framed.image)?,
                width: framed.image.width(),
                height: framed.image.height(),
                instruction: framed.instruction,
            })
        })
        .await?;

        info!(
            angle = %angle,
            zoom,
            width = outcome.width,
            height = outcome.height,
            "Framing complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::CameraAngle;
    use crate::service::test_support::*;

    fn bounds() -> FramingConfig {
        FramingConfig {
            pad_color: "#ffffff".to_string(),
            min_zoom: 50,
            max_zoom: 200,
        }
    }

    #[test]
    fn test_validate_zoom() {
        assert!(validate_zoom(50, &bounds()).is_ok());
        assert!(validate_zoom(200, &bounds()).is_ok());
        assert!(validate_zoom(49, &bounds()).is_err());
        assert!(validate_zoom(201, &bounds()).is_err());
    }

    #[test]
    fn test_bad_pad_color_falls_back() {
        let mut config = bounds();
        config.pad_color = "teal".to_string();
        assert_eq!(pad_color(&config), FALLBACK_PAD);

        config.pad_color = "#000000".to_string();
        assert_eq!(pad_color(&config), Rgba([0, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_frame_zoom_out() {
        let service = service_with(FakeLocator::not_found());
        let outcome = service
            .frame(FramingRequest {
                image: room_data_url(200, 100, [0.0, 0.0, 1000.0, 1000.0]),
                angle: CameraAngle::Side,
                zoom: 50,
            })
            .await
            .unwrap();

        assert_eq!((outcome.width, outcome.height), (200, 100));
        assert!(outcome.instruction.contains("side angle"));
        assert!(outcome.instruction.contains("border"));

        let decoded = decode_image_payload(&outcome.image).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &FALLBACK_PAD);
        assert_eq!(decoded.get_pixel(100, 50), &Rgba([200, 30, 30, 255]));
    }

    #[tokio::test]
    async fn test_frame_rejects_out_of_range_zoom() {
        let service = service_with(FakeLocator::not_found());
        let err = service
            .frame(FramingRequest {
                image: room_data_url(20, 20, [0.0, 0.0, 1000.0, 1000.0]),
                angle: CameraAngle::Original,
                zoom: 250,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));
    }
}
