//! API response types.
//!
//! Errors are answered with a short plain-text message. Internal details
//! never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Application error type for Axum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
}

impl AppError {
    /// Creates an error answered with `status` and a plain-text `message`.
    #[must_use]
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// `400 Bad Request`.
    #[must_use]
    pub const fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// `404 Not Found`.
    #[must_use]
    pub const fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `500 Internal Server Error`.
    #[must_use]
    pub const fn internal(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<T, AppError>;
