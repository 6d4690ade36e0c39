use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{debug, error, info, warn};

use super::{error::ApiError, AppState};
use crate::aggregator::AggregatedTickerData;
use crate::auth::Identity;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields, provided they are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        debug!("Unreadable login body: {}", e);
        ApiError::MissingCredentials
    })?;

    let (username, password) = request.credentials().ok_or(ApiError::MissingCredentials)?;

    if !state.policy.accepts(username, password) {
        warn!("Login rejected for user: {}", username);
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(username).map_err(|e| {
        error!("Failed to issue token for {}: {}", username, e);
        ApiError::Internal
    })?;

    info!("Issued access token for user: {}", username);
    Ok(Json(LoginResponse { access_token }))
}

pub async fn exchange_data(
    State(state): State<AppState>,
    Extension(Identity(user)): Extension<Identity>,
) -> Result<Json<AggregatedTickerData>, ApiError> {
    info!("Fetching exchange data for user: {}", user);

    let data = state.aggregator.fetch().await?;
    Ok(Json(data))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Body for requests whose handler panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    ApiError::Internal.into_response()
}
