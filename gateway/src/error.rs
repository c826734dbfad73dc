//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use open_data::OpenDataError;
use safety_core::SafetyError;
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<SafetyError> for ApiError {
    fn from(e: SafetyError) -> Self {
        let msg = e.to_string();
        match e {
            SafetyError::InvalidCoordinates { .. }
            | SafetyError::InvalidRating(_)
            | SafetyError::InvalidVerificationCode
            | SafetyError::EmailNotVerified
            | SafetyError::MissingField(_) => Self::BadRequest(msg),
            SafetyError::InvalidCredentials => Self::Unauthorized(msg),
            SafetyError::HotspotNotFound(_) | SafetyError::SessionNotFound(_) | SafetyError::UserNotFound(_) => {
                Self::NotFound(msg)
            }
            SafetyError::UserExists(_) | SafetyError::SessionStopped(_) => Self::Conflict(msg),
        }
    }
}

impl From<OpenDataError> for ApiError {
    fn from(e: OpenDataError) -> Self {
        match e {
            OpenDataError::NotFound(_) => Self::NotFound(e.to_string()),
            OpenDataError::RequestFailed(_) | OpenDataError::ApiError(_) | OpenDataError::ParseError(_) => {
                Self::Upstream(e.to_string())
            }
        }
    }
}
