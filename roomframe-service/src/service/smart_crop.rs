//! Smart crop pipeline: decode, locate, resolve, composite, encode.

use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::config::SmartCropConfig;
use crate::error::{CropError, ServiceError, ServiceResult};
use crate::image_data::{decode_image_payload, encode_detection_jpeg, encode_png_data_url};
use crate::smart_crop::{BoundingBox, FillRatio, crop_to_object};

use super::requests::{SmartCropOutcome, SmartCropRequest};
use super::{RoomframeService, run_blocking};

/// Check a requested fill ratio against the configured bounds
fn validate_fill_ratio(fill_ratio: f64, bounds: &SmartCropConfig) -> ServiceResult<FillRatio> {
    if !(bounds.min_fill_ratio..=bounds.max_fill_ratio).contains(&fill_ratio) {
        return Err(ServiceError::invalid_request(format!(
            "fill_ratio must be between {} and {}, got {}",
            bounds.min_fill_ratio, bounds.max_fill_ratio, fill_ratio
        )));
    }

    FillRatio::new(fill_ratio).ok_or_else(|| {
        ServiceError::invalid_request(format!(
            "fill_ratio must be above 0 and at most 100, got {}",
            fill_ratio
        ))
    })
}

impl RoomframeService {
    /// Crop the image around the named object
    pub async fn smart_crop(&self, request: SmartCropRequest) -> ServiceResult<SmartCropOutcome> {
        let span = info_span!(
            "smart_crop",
            request_id = %Uuid::new_v4(),
            object = %request.object_name.trim()
        );
        self.run_smart_crop(request).instrument(span).await
    }

    async fn run_smart_crop(&self, request: SmartCropRequest) -> ServiceResult<SmartCropOutcome> {
        let SmartCropRequest {
            image,
            object_name,
            fill_ratio,
            aspect_ratio,
        } = request;

        let object_name = object_name.trim().to_string();
        if object_name.is_empty() {
            return Err(ServiceError::invalid_request("object_name must not be empty"));
        }

        let (fill, max_dimension) = {
            let config = self.runtime_config.dynamic();
            (
                validate_fill_ratio(fill_ratio, &config.smart_crop)?,
                config.vision.detection_max_dimension,
            )
        };

        let (source, detection_jpeg) = run_blocking(move || {
            let decoded = decode_image_payload(&image)?;
            let jpeg = encode_detection_jpeg(&decoded, max_dimension)?;
            Ok((decoded.to_rgba8(), jpeg))
        })
        .await?;

        debug!(
            width = source.width(),
            height = source.height(),
            "Decoded source image"
        );

        let located = self.locator.locate(&detection_jpeg, &object_name).await?;
        let Some(values) = located else {
            info!("Object not detected");
            return Err(CropError::DetectionFailure { object_name }.into());
        };
        let bbox = BoundingBox::from_locator(values)?;

        let outcome = run_blocking(move || {
            let (resolved, canvas) = crop_to_object(&source, &bbox, fill, aspect_ratio)?;
            let image = encode_png_data_url(&canvas)?;
            Ok(SmartCropOutcome {
                image,
                width: canvas.width(),
                height: canvas.height(),
                crop: resolved.rect,
                bounding_box: bbox,
                scaled_down: resolved.scaled_down(),
            })
        })
        .await?;

        info!(
            width = outcome.width,
            height = outcome.height,
            aspect = %aspect_ratio,
            fill = fill.percent(),
            scaled_down = outcome.scaled_down,
            "Smart crop complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::*;
    use crate::smart_crop::TargetAspectRatio;
    use image::Rgba;

    const SOFA: [f64; 4] = [400.0, 400.0, 600.0, 600.0];

    fn request(fill_ratio: f64, aspect_ratio: TargetAspectRatio) -> SmartCropRequest {
        SmartCropRequest {
            image: room_data_url(1000, 500, SOFA),
            object_name: "sofa".to_string(),
            fill_ratio,
            aspect_ratio,
        }
    }

    #[test]
    fn test_validate_fill_ratio_bounds() {
        let bounds = SmartCropConfig {
            min_fill_ratio: 10.0,
            max_fill_ratio: 100.0,
        };
        assert!(validate_fill_ratio(10.0, &bounds).is_ok());
        assert!(validate_fill_ratio(100.0, &bounds).is_ok());
        assert!(validate_fill_ratio(9.9, &bounds).is_err());
        assert!(validate_fill_ratio(f64::NAN, &bounds).is_err());

        let loose = SmartCropConfig {
            min_fill_ratio: 0.0,
            max_fill_ratio: 150.0,
        };
        assert!(validate_fill_ratio(0.0, &loose).is_err());
        assert!(validate_fill_ratio(120.0, &loose).is_err());
    }

    #[tokio::test]
    async fn test_smart_crop_success() {
        let locator = FakeLocator::found(SOFA);
        let service = service_with(locator.clone());

        let outcome = service
            .smart_crop(request(50.0, TargetAspectRatio::Square))
            .await
            .unwrap();

        // 200x100 object, 400px wide crop centered on (500, 250)
        assert_eq!((outcome.width, outcome.height), (400, 400));
        assert_eq!((outcome.crop.left, outcome.crop.top), (300, 50));
        assert!(!outcome.scaled_down);
        assert_eq!(locator.call_count(), 1);

        let decoded = decode_image_payload(&outcome.image).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (400, 400));
        assert_eq!(decoded.get_pixel(200, 200), &Rgba([200, 30, 30, 255]));
        assert_eq!(decoded.get_pixel(5, 5), &Rgba([240, 235, 220, 255]));
    }

    #[tokio::test]
    async fn test_smart_crop_scales_down_large_crop() {
        let service = service_with(FakeLocator::found(SOFA));

        let outcome = service
            .smart_crop(request(10.0, TargetAspectRatio::Landscape16x9))
            .await
            .unwrap();

        // Ideal 2000x1125 exceeds 1000x500, scaled by 0.4444
        assert!(outcome.scaled_down);
        assert!(outcome.width <= 1000 && outcome.height <= 500);
        assert_eq!(outcome.height, 500);
    }

    #[tokio::test]
    async fn test_not_detected() {
        let service = service_with(FakeLocator::not_found());
        let err = service
            .smart_crop(request(50.0, TargetAspectRatio::Square))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Crop(CropError::DetectionFailure { ref object_name }) if object_name == "sofa"
        ));
    }

    #[tokio::test]
    async fn test_degenerate_detection() {
        let service = service_with(FakeLocator::found([500.0, 500.0, 500.0, 600.0]));
        let err = service
            .smart_crop(request(50.0, TargetAspectRatio::Square))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Crop(CropError::InvalidDetection { .. })
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_detection() {
        let service = service_with(FakeLocator::found([0.0, 0.0, 1001.0, 500.0]));
        let err = service
            .smart_crop(request(50.0, TargetAspectRatio::Square))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Crop(CropError::InvalidDetection { .. })
        ));
    }

    #[tokio::test]
    async fn test_locator_outage_is_not_a_detection_failure() {
        let service = service_with(FakeLocator::unavailable());
        let err = service
            .smart_crop(request(50.0, TargetAspectRatio::Square))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Vision(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_locator() {
        let locator = FakeLocator::found(SOFA);
        let service = service_with(locator.clone());

        let err = service
            .smart_crop(request(5.0, TargetAspectRatio::Square))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));

        let mut blank = request(50.0, TargetAspectRatio::Square);
        blank.object_name = "   ".to_string();
        let err = service.smart_crop(blank).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));

        let mut corrupt = request(50.0, TargetAspectRatio::Square);
        corrupt.image = "data:image/png;base64,aGVsbG8gd29ybGQ=".to_string();
        let err = service.smart_crop(corrupt).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Crop(CropError::CompositingFailure { .. })
        ));

        assert_eq!(locator.call_count(), 0);
    }
}
