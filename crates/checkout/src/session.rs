//! Session token storage.
//!
//! The bearer token is issued elsewhere (the login flow) and dropped into
//! storage under [`AUTH_TOKEN_KEY`]. This module only stores it and checks
//! that it is present; it never inspects the token.

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "jwt";

/// Reads and writes the shopper's bearer token.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a session store over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored bearer token, if one is present and non-blank.
    ///
    /// Storage failures are logged and reported as "no token".
    pub fn auth_token(&self) -> Option<SecretString> {
        match self.store.get(AUTH_TOKEN_KEY) {
            Ok(Some(token)) if !token.trim().is_empty() => {
                Some(SecretString::from(token.trim().to_owned()))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// Whether a token is available.
    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    /// Store a bearer token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_auth_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(AUTH_TOKEN_KEY, token.expose_secret())
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(AUTH_TOKEN_KEY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_no_token_by_default() {
        let session = SessionStore::new(MemoryStore::new());
        assert!(session.auth_token().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_and_clear_token() {
        let session = SessionStore::new(MemoryStore::new());
        session
            .set_auth_token(&SecretString::from("eyJhbGciOi.payload.sig"))
            .unwrap();

        let token = session.auth_token().unwrap();
        assert_eq!(token.expose_secret(), "eyJhbGciOi.payload.sig");

        session.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_blank_token_counts_as_absent() {
        let backing = MemoryStore::new();
        backing.set(AUTH_TOKEN_KEY, "   ").unwrap();
        let session = SessionStore::new(backing);
        assert!(session.auth_token().is_none());
    }
}
