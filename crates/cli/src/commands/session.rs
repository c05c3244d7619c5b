//! Session commands.
//!
//! The token comes from the login flow; this only stores it where checkout
//! will look for it.

use clap::Subcommand;
use kingburger_checkout::{KeyValueStore, SessionStore, StorageError};
use secrecy::SecretString;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Store the bearer token used for orders
    SetToken {
        /// Bearer token
        token: String,
    },
    /// Forget the stored token
    Clear,
    /// Show whether a token is stored
    Status,
}

/// Run a session subcommand.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[allow(clippy::print_stdout)] // CLI output
pub fn run<S: KeyValueStore>(
    session: &SessionStore<S>,
    action: SessionAction,
) -> Result<(), StorageError> {
    match action {
        SessionAction::SetToken { token } => {
            session.set_auth_token(&SecretString::from(token))?;
            println!("Token saved.");
        }
        SessionAction::Clear => {
            session.clear()?;
            println!("Logged out.");
        }
        SessionAction::Status => {
            if session.is_authenticated() {
                println!("Logged in.");
            } else {
                println!("Not logged in.");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingburger_checkout::MemoryStore;

    use super::*;

    #[test]
    fn test_set_and_clear() {
        let session = SessionStore::new(MemoryStore::new());
        run(
            &session,
            SessionAction::SetToken {
                token: "abc".to_string(),
            },
        )
        .unwrap();
        assert!(session.is_authenticated());

        run(&session, SessionAction::Clear).unwrap();
        assert!(!session.is_authenticated());
    }
}
