//! Credential checking for the login endpoint.

/// Decides whether a username/password pair may obtain a token.
///
/// Only called with non-empty fields; the login handler rejects blank input first.
pub trait CredentialPolicy: Send + Sync {
    fn accepts(&self, username: &str, password: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Demo policy: every non-empty credential pair is accepted.
///
/// There is no user store behind this. A real deployment has to swap in a
/// policy that actually verifies passwords.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAcceptPolicy;

impl CredentialPolicy for AlwaysAcceptPolicy {
    fn accepts(&self, _username: &str, _password: &str) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "always-accept (demo)"
    }
}
