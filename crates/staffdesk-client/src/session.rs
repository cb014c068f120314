//! Session provider capability.
//!
//! Token acquisition and refresh live outside the core. The client only asks
//! for the current bearer token right before each request.

use parking_lot::RwLock;
use smol_str::SmolStr;

/// Source of the bearer token attached to every backend request.
pub trait SessionProvider: Send + Sync {
    /// Current access token, `None` when signed out.
    fn access_token(&self) -> Option<SmolStr>;
}

/// Fixed token, or permanently signed out.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<SmolStr>,
}

impl StaticSession {
    /// Session holding `token`.
    pub fn new(token: impl Into<SmolStr>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Session without credentials; every call fails with an auth error.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<SmolStr> {
        self.token.clone()
    }
}

/// Token that an external session module can replace at runtime.
#[derive(Debug, Default)]
pub struct SharedSession {
    token: RwLock<Option<SmolStr>>,
}

impl SharedSession {
    /// Signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh token (sign in or refresh).
    pub fn replace(&self, token: impl Into<SmolStr>) {
        *self.token.write() = Some(token.into());
    }

    /// Drops the token (sign out).
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl SessionProvider for SharedSession {
    fn access_token(&self) -> Option<SmolStr> {
        self.token.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_session_tracks_sign_in_and_out() {
        let session = SharedSession::new();
        assert_eq!(session.access_token(), None);
        session.replace("abc");
        assert_eq!(session.access_token().as_deref(), Some("abc"));
        session.replace("def");
        assert_eq!(session.access_token().as_deref(), Some("def"));
        session.clear();
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn static_session() {
        assert_eq!(StaticSession::anonymous().access_token(), None);
        assert_eq!(
            StaticSession::new("t0k").access_token().as_deref(),
            Some("t0k")
        );
    }
}
