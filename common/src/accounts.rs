use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{get_json, set_json, KeyValueStore, StoreError};

/// Storage key for the logged-in session record.
pub const SESSION_KEY: &str = "session";

/// Storage key prefix shared by all credential records.
pub const CREDENTIAL_PREFIX: &str = "credentials:";

/// Storage key holding the credential record for `email`.
pub fn credential_key(email: &str) -> String {
    format!("{CREDENTIAL_PREFIX}{email}")
}

/// Stored per-user credential record.
///
/// The password is kept in plaintext: this mirrors the storefront's
/// local-storage-only account model, which is a demo stand-in rather than
/// real authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub password: String,
    pub display_name: String,
}

/// The currently logged-in user. Anyone with storage access can forge this;
/// it is a UI convenience flag, not an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("please fill in all fields")]
    MissingFields,
    #[error("password must be at least {0} characters")]
    ShortPassword(usize),
    #[error("an account with this email already exists")]
    AlreadyRegistered,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

const MIN_PASSWORD_LEN: usize = 6;

/// Registration, login, and session state over the key-value store.
pub struct Accounts<S> {
    store: S,
}

impl<S: KeyValueStore> Accounts<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an account and log it in. Uniqueness is a pre-check only,
    /// not a constraint: a concurrent writer can still race this.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::ShortPassword(MIN_PASSWORD_LEN));
        }
        let key = credential_key(email);
        if get_json::<Credential, _>(&self.store, &key)?.is_some() {
            return Err(AuthError::AlreadyRegistered);
        }
        let credential = Credential {
            password: password.to_string(),
            display_name: name.to_string(),
        };
        set_json(&mut self.store, &key, &credential)?;
        self.start_session(email, name)
    }

    /// Plaintext password comparison against the stored credential.
    pub fn log_in(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let credential: Credential = get_json(&self.store, &credential_key(email))?
            .ok_or(AuthError::InvalidCredentials)?;
        if credential.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        self.start_session(email, &credential.display_name)
    }

    /// Stand-in for a third-party OAuth flow: registers a random demo
    /// account and logs it in.
    pub fn log_in_google_stub(&mut self) -> Result<Session, AuthError> {
        let email = format!("user{}@gmail.com", rand::thread_rng().gen_range(0..1000));
        let credential = Credential {
            password: "google-auth".to_string(),
            display_name: "Google User".to_string(),
        };
        set_json(&mut self.store, &credential_key(&email), &credential)?;
        self.start_session(&email, &credential.display_name)
    }

    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        get_json(&self.store, SESSION_KEY)
    }

    pub fn log_out(&mut self) {
        self.store.remove(SESSION_KEY);
    }

    /// Display name registered for `email`, if any.
    pub fn display_name(&self, email: &str) -> Result<Option<String>, StoreError> {
        Ok(get_json::<Credential, _>(&self.store, &credential_key(email))?
            .map(|c| c.display_name))
    }

    fn start_session(&mut self, email: &str, name: &str) -> Result<Session, AuthError> {
        let session = Session {
            email: email.to_string(),
            display_name: name.to_string(),
        };
        set_json(&mut self.store, SESSION_KEY, &session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn register_logs_the_user_in() {
        let mut accounts = Accounts::new(MemoryStore::new());
        let session = accounts
            .register("Ivan Ivanov", "ivan@example.com", "secret1")
            .unwrap();
        assert_eq!(session.email, "ivan@example.com");
        assert_eq!(accounts.session().unwrap(), Some(session));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut accounts = Accounts::new(MemoryStore::new());
        accounts
            .register("Ivan", "ivan@example.com", "secret1")
            .unwrap();
        let err = accounts
            .register("Other Ivan", "ivan@example.com", "secret2")
            .unwrap_err();
        assert!(matches!(err, AuthError::AlreadyRegistered));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut accounts = Accounts::new(MemoryStore::new());
        let err = accounts
            .register("Ivan", "ivan@example.com", "abc")
            .unwrap_err();
        assert!(matches!(err, AuthError::ShortPassword(6)));
    }

    #[test]
    fn login_requires_the_exact_password() {
        let mut accounts = Accounts::new(MemoryStore::new());
        accounts
            .register("Ivan", "ivan@example.com", "secret1")
            .unwrap();
        accounts.log_out();
        assert!(accounts.session().unwrap().is_none());

        let err = accounts.log_in("ivan@example.com", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(accounts.session().unwrap().is_none());

        let session = accounts.log_in("ivan@example.com", "secret1").unwrap();
        assert_eq!(session.display_name, "Ivan");
    }

    #[test]
    fn unknown_email_fails_like_a_wrong_password() {
        let mut accounts = Accounts::new(MemoryStore::new());
        let err = accounts.log_in("nobody@example.com", "secret1").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn google_stub_creates_a_logged_in_demo_account() {
        let mut accounts = Accounts::new(MemoryStore::new());
        let session = accounts.log_in_google_stub().unwrap();
        assert!(session.email.ends_with("@gmail.com"));
        assert_eq!(
            accounts.display_name(&session.email).unwrap().as_deref(),
            Some("Google User")
        );
    }
}
