//! Error taxonomy shared by the store, the query service and provisioning.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Requested language has no rows, or a required input file is missing
    #[error("{0}")]
    NotFound(String),

    /// Duplicate `(key, lang)` pair, key-path collision or malformed row
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Operator declined a confirmation or picked an unknown menu entry
    #[error("Aborted: {0}")]
    UserAborted(String),

    #[error("{0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::ConstraintViolation(db_err.message().to_string())
            }
            _ => Error::Internal(err.to_string()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ConstraintViolation(_) => StatusCode::CONFLICT,
            Error::UserAborted(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
