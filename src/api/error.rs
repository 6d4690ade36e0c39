//! The only place where component errors become HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::aggregator::FetchError;
use crate::auth::AuthError;

pub const MSG_MISSING_CREDENTIALS: &str = "Missing username or password";
pub const MSG_BAD_CREDENTIALS: &str = "Bad username or password";
pub const MSG_MISSING_TOKEN: &str = "Missing Authorization Header";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch cryptocurrency data";
pub const MSG_NOT_FOUND: &str = "Resource not found";
pub const MSG_INTERNAL: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", MSG_MISSING_CREDENTIALS)]
    MissingCredentials,

    #[error("{}", MSG_BAD_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", MSG_MISSING_TOKEN)]
    MissingToken,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{}", MSG_NOT_FOUND)]
    NotFound,

    #[error("{}", MSG_INTERNAL)]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::MissingToken | ApiError::Auth(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            // Login failures answer with `msg`, everything else with `error`.
            ApiError::MissingCredentials | ApiError::InvalidCredentials => {
                json!({ "msg": self.to_string() })
            }
            // Upstream causes stay in the server log.
            ApiError::Fetch(_) => json!({ "error": MSG_FETCH_FAILED }),
            _ => json!({ "error": self.to_string() }),
        };

        (self.status(), Json(body)).into_response()
    }
}
