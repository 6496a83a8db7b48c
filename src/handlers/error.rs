// src/handlers/error.rs
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

/// Errors surfaced to API callers. Failures of the optional calendar
/// provider never reach this type; they are absorbed at the fetch site.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    UpstreamData(String),

    #[error("{0}")]
    Computation(String),
}

impl ApiError {
    pub fn missing_input(message: impl Into<String>) -> Self {
        ApiError::MissingInput(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::UpstreamData(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        ApiError::Computation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamData(_) => StatusCode::NOT_FOUND,
            ApiError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for ApiError {}
