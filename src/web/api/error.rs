use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::locator::LocatorError;
use crate::predict::PredictError;
use crate::rf::RfError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(&'static str),
    Unavailable(&'static str),
    Predict(PredictError),
    Internal(String),
}

impl From<LocatorError> for ApiError {
    fn from(e: LocatorError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<RfError> for ApiError {
    fn from(e: RfError) -> Self {
        match e {
            RfError::UnknownCable(_) => ApiError::NotFound("cable_not_found"),
            _ => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidWindow => ApiError::Validation(e.to_string()),
            _ => ApiError::Predict(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::NotFound(reason) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::new(reason))).into_response()
            }
            ApiError::Unavailable(reason) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(reason)),
            )
                .into_response(),
            ApiError::Predict(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("prediction_failed", &e.to_string())),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("internal_error")),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("cable_not_found"), StatusCode::NOT_FOUND),
            (
                ApiError::Unavailable("predictions_not_configured"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(PredictError::Propagation("decayed".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Internal("task panicked".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn domain_errors_map_to_client_errors() {
        assert!(matches!(
            ApiError::from(RfError::UnknownCable("rg999".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(LocatorError::LatitudeOutOfRange(91.0)),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from(PredictError::InvalidWindow),
            ApiError::Validation(_)
        ));
    }
}
