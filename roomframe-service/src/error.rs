use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failures of the smart-crop pipeline itself
#[derive(Error, Debug)]
pub enum CropError {
    /// The locator returned no usable bounding box
    #[error("Could not find \"{object_name}\" in the image")]
    DetectionFailure { object_name: String },

    /// A bounding box was returned but violates the locator contract
    #[error("Invalid detection: {reason}")]
    InvalidDetection { reason: String },

    #[error("Image processing failed: {message}")]
    CompositingFailure {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },
}

impl CropError {
    pub fn invalid_detection(reason: impl Into<String>) -> Self {
        CropError::InvalidDetection {
            reason: reason.into(),
        }
    }

    pub fn compositing(message: impl Into<String>, source: image::ImageError) -> Self {
        CropError::CompositingFailure {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Vision model client errors
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Connection failed to vision backend at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Vision request failed (status {status}): {message}")]
    Request { status: u16, message: String },

    #[error("Invalid response from vision backend")]
    InvalidResponse {
        #[source]
        source: reqwest::Error,
    },
}

/// API error response (matches Axum's built-in JsonRejection format)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            message: message.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Crop(CropError::DetectionFailure { .. }) => StatusCode::NOT_FOUND,
            ServiceError::Crop(CropError::InvalidDetection { .. }) => StatusCode::BAD_GATEWAY,
            ServiceError::Crop(CropError::CompositingFailure { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Vision(_) => StatusCode::BAD_GATEWAY,
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Config { .. } | ServiceError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Crop(CropError::DetectionFailure { .. }) => "object_not_detected",
            ServiceError::Crop(CropError::InvalidDetection { .. }) => "invalid_detection",
            ServiceError::Crop(CropError::CompositingFailure { .. }) => "compositing_failed",
            ServiceError::Vision(VisionError::Connection { .. }) => "vision_unavailable",
            ServiceError::Vision(VisionError::ModelNotFound { .. }) => "vision_model_not_found",
            ServiceError::Vision(_) => "vision_error",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        if status.is_server_error() {
            tracing::warn!(error = %format_error_chain_ref(&self), code = %code, "Request failed");
        }

        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Render an error and all of its sources as `outer: inner: innermost`
pub fn format_error_chain_ref(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_kinds_are_distinguishable() {
        let not_found = ServiceError::from(CropError::DetectionFailure {
            object_name: "lamp".to_string(),
        });
        let degenerate = ServiceError::from(CropError::invalid_detection("zero height"));

        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.error_code(), "object_not_detected");
        assert_eq!(degenerate.error_code(), "invalid_detection");
        assert_ne!(not_found.error_code(), degenerate.error_code());
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::other("truncated stream");
        let err = CropError::compositing("Failed to decode image", image::ImageError::IoError(io));
        let rendered = format_error_chain_ref(&err);
        assert!(rendered.starts_with("Image processing failed: Failed to decode image"));
        assert!(rendered.contains("truncated stream"));
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let err = ServiceError::invalid_request("fill_ratio out of range");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request: fill_ratio out of range");
    }
}
