//! Bearer token authentication.
//! HS256 JWTs carrying the user identity in `sub`; the server keeps no session state.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::api::error::ApiError;

pub mod policy;

pub use policy::{AlwaysAcceptPolicy, CredentialPolicy};

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const TOKEN_TYPE_ACCESS: &str = "access";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    Malformed,
    #[error("Signature verification failed")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Identity of the caller, inserted into request extensions by [`require_bearer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

/// Mints and verifies access tokens with a single server-held secret.
///
/// Holds only immutable key material, so one instance is shared across
/// all request tasks behind an `Arc`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Returns the embedded identity if the signature holds and `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::BadSignature
                }
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(data.claims.sub)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Middleware guarding protected routes.
///
/// Rejects with 401 when the header is missing or the token does not verify;
/// otherwise stores the caller's [`Identity`] in request extensions.
pub async fn require_bearer(
    State(issuer): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::MissingToken)?;

    let identity = issuer.verify(token)?;
    request.extensions_mut().insert(Identity(identity));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_verify_round_trip_identity() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("alice").unwrap();

        assert_eq!(issuer.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_expiry_is_one_hour_after_issue() {
        let issuer = TokenIssuer::new(SECRET);
        let issued_at = Utc::now();
        let token = issuer.issue_at("alice", issued_at).unwrap();

        let just_before = issued_at + Duration::seconds(3599);
        let at_expiry = issued_at + Duration::seconds(3600);

        assert_eq!(issuer.verify_at(&token, just_before).unwrap(), "alice");
        assert_eq!(issuer.verify_at(&token, at_expiry), Err(AuthError::Expired));
    }

    #[test]
    fn test_token_issued_two_hours_ago_is_expired() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer
            .issue_at("bob", Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(issuer.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_foreign_secret_fails_signature() {
        let ours = TokenIssuer::new(SECRET);
        let theirs = TokenIssuer::new("another-secret");
        let token = theirs.issue("mallory").unwrap();

        assert_eq!(ours.verify(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let issuer = TokenIssuer::new(SECRET);

        assert_eq!(issuer.verify("not-a-token"), Err(AuthError::Malformed));
        assert_eq!(issuer.verify(""), Err(AuthError::Malformed));
        assert_eq!(issuer.verify("a.b.c"), Err(AuthError::Malformed));
    }

    #[test]
    fn test_claims_carry_access_type_and_unique_jti() {
        let issuer = TokenIssuer::new(SECRET);
        let first = issuer.issue("alice").unwrap();
        let second = issuer.issue("alice").unwrap();

        let decode_claims = |token: &str| {
            decode::<Claims>(token, &issuer.decoding_key, &issuer.validation)
                .unwrap()
                .claims
        };
        let a = decode_claims(&first);
        let b = decode_claims(&second);

        assert_eq!(a.token_type, "access");
        assert_eq!(a.exp - a.iat, 3600);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
