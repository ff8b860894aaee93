//! Typed application errors.
//!
//! A handler that cannot satisfy a request returns an [`HttpError`]. The
//! value travels unchanged through the logging layer and is rendered exactly
//! once, as a JSON envelope, by [`with_errors`](crate::middleware::with_errors).
//!
//! ```rust
//! use teller::HttpError;
//!
//! let e = HttpError::bad_request("username or password is empty");
//! assert_eq!(e.status_code(), 400);
//! assert_eq!(e.message(), "username or password is empty");
//! ```

use std::fmt;

use http::StatusCode;
use serde::Serialize;

/// Message shown to clients for every internal server error. The real cause
/// stays server-side.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

/// A failure carrying an HTTP error status and a human-readable message.
///
/// The status is always a client or server error (`>= 400`). Only
/// `statusCode` and `message` are serialized; the optional `cause` is kept for
/// audit sinks and never sent to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{status_code} {message}")]
pub struct HttpError {
    status_code: u16,
    message: String,
    #[serde(skip)]
    cause: Option<String>,
}

impl HttpError {
    /// Builds an error with an explicit status.
    ///
    /// A status below 400 is not an error; it is coerced to 500 so the
    /// invariant holds for every downstream consumer.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let status = if status.is_client_error() || status.is_server_error() {
            status
        } else {
            tracing::warn!(
                status = status.as_u16(),
                %message,
                "non-error status used for HttpError, coercing to 500"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status_code: status.as_u16(), message, cause: None }
    }

    /// `400 Bad Request` carrying a validation message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// `401 Unauthorized`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// `403 Forbidden`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// `404 Not Found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `500 Internal Server Error` wrapping an underlying fault.
    ///
    /// The client sees [`INTERNAL_SERVER_ERROR_MESSAGE`]; the fault's
    /// `Display` text is retained as [`cause`](Self::cause) for the audit log.
    pub fn internal_server_error(cause: impl fmt::Display) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: INTERNAL_SERVER_ERROR_MESSAGE.to_owned(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn status_code(&self) -> u16 { self.status_code }
    pub fn message(&self) -> &str { &self.message }
    pub fn cause(&self) -> Option<&str> { self.cause.as_deref() }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_client_error(&self) -> bool { (400..500).contains(&self.status_code) }
    pub fn is_server_error(&self) -> bool { self.status_code >= 500 }
}
