use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Wallet verification failed. Deliberately carries no detail about
    /// which check rejected.
    #[error("Invalid wallet signature")]
    InvalidWalletSignature,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Bad request: {0}")]
    BadRequestWithHint(String, String),
}

impl ApiError {
    pub fn bad_request_with_hint(msg: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::BadRequestWithHint(msg.into(), hint.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, hint) = match &self {
            ApiError::InvalidWalletSignature => (
                StatusCode::UNAUTHORIZED,
                "Invalid wallet signature".to_string(),
                Some("Obtain a fresh nonce from /api/auth/nonce and sign the challenge again"),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                msg.clone(),
                Some("The resource already exists or conflicts with existing data"),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::BadRequestWithHint(msg, hint) => {
                (StatusCode::BAD_REQUEST, msg.clone(), Some(hint.as_str()))
            }
        };

        let body = if let Some(h) = hint {
            ApiResponse::<()>::error_with_hint(message, h)
        } else {
            ApiResponse::<()>::error(message)
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
