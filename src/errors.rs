use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing query parameters, caught before any outbound call.
    #[error("{0}")]
    InvalidQuery(String),

    /// Upstream geocoding/weather/tile failure. No retry.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

// Every error is returned as HTTP 200 with an `{"error": ...}` body.
// Clients treat errors as data and branch on the presence of the field,
// never on the status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::InvalidQuery(msg) => msg.clone(),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                msg.clone()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
        };

        (StatusCode::OK, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_respond_with_200() {
        let response = AppError::InvalidQuery("ERROR: bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = AppError::Upstream("ERROR: upstream down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_display_is_bare_message() {
        let err = AppError::InvalidQuery("ERROR: Please provide valid coordinates.".to_string());
        assert_eq!(err.to_string(), "ERROR: Please provide valid coordinates.");
    }
}
