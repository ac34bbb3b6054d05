//! Mapping of engine errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domains::offers::OfferError;

/// Error type returned by every handler
#[derive(Debug)]
pub enum ApiError {
    /// The route needs a signed-in user
    Unauthorized,
    Offer(OfferError),
}

impl From<OfferError> for ApiError {
    fn from(err: OfferError) -> Self {
        ApiError::Offer(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Offer(OfferError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Offer(OfferError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Offer(OfferError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Offer(OfferError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Offer(OfferError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Unauthorized => "Authentication required".to_string(),
            // Store and cache details stay in the logs
            ApiError::Offer(OfferError::Transient(e)) => {
                error!(error = ?e, "Request failed on store or cache");
                "Temporary failure, please retry".to_string()
            }
            ApiError::Offer(e) => e.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
