use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use super::{handlers, AppState};
use crate::auth;

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/exchange-data", get(handlers::exchange_data))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .with_state(state)
}
