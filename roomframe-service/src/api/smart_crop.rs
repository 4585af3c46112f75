//! Smart crop endpoint.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::service::{SmartCropOutcome, SmartCropRequest};

use super::AppState;

/// POST /api/smart-crop - crop the image around a named object
pub async fn smart_crop_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SmartCropRequest>,
) -> Result<Json<SmartCropOutcome>, ServiceError> {
    let outcome = state.service.smart_crop(request).await?;
    Ok(Json(outcome))
}
