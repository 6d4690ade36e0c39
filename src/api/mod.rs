pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::auth::{CredentialPolicy, TokenIssuer};

pub use error::ApiError;
pub use routes::create_router;

/// Shared per-request state; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenIssuer>,
    pub policy: Arc<dyn CredentialPolicy>,
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenIssuer>,
        policy: Arc<dyn CredentialPolicy>,
        aggregator: Arc<Aggregator>,
    ) -> Self {
        Self {
            tokens,
            policy,
            aggregator,
        }
    }
}
