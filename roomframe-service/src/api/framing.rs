//! Camera framing endpoint.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::service::{FramingOutcome, FramingRequest};

use super::AppState;

/// POST /api/framing - zoom around the center and describe the camera angle
pub async fn framing_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FramingRequest>,
) -> Result<Json<FramingOutcome>, ServiceError> {
    let outcome = state.service.frame(request).await?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, send_json};
    use crate::service::test_support::{FakeLocator, room_data_url};

    #[tokio::test]
    async fn test_framing_zoom_in() {
        let (status, response) = send_json(
            app(FakeLocator::not_found()),
            Method::POST,
            "/api/framing",
            Some(json!({
                "image": room_data_url(64, 48, [250.0, 250.0, 750.0, 750.0]),
                "angle": "Top",
                "zoom": 150,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["width"], 64);
        assert_eq!(response["height"], 48);
        let instruction = response["instruction"].as_str().unwrap();
        assert!(instruction.contains("high angle"));
        assert!(instruction.contains("150%"));
    }

    #[tokio::test]
    async fn test_framing_bad_zoom() {
        let (status, response) = send_json(
            app(FakeLocator::not_found()),
            Method::POST,
            "/api/framing",
            Some(json!({
                "image": room_data_url(16, 16, [0.0, 0.0, 1000.0, 1000.0]),
                "zoom": 10,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "invalid_request");
    }

    #[tokio::test]
    async fn test_framing_corrupt_image() {
        let (status, response) = send_json(
            app(FakeLocator::not_found()),
            Method::POST,
            "/api/framing",
            Some(json!({ "image": "Zm9vYmFy", "zoom": 100 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["code"], "compositing_failed");
    }
}
