//! The single credential pair guarding the gateway.

use std::env;
use std::fmt;

/// Environment variable holding the expected basic-auth username.
///
/// The username also names the search index.
pub const USERNAME_ENV: &str = "BASIC_AUTH_USERNAME";

/// Environment variable holding the expected basic-auth password.
pub const PASSWORD_ENV: &str = "BASIC_AUTH_PASSWORD";

/// Expected HTTP basic-auth credentials, read once at startup.
///
/// When either half is missing every request fails authentication.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    /// Credentials that accept exactly `username` / `password`.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Credentials that reject every request.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Read the credential pair from `BASIC_AUTH_USERNAME` and `BASIC_AUTH_PASSWORD`.
    pub fn from_env() -> Self {
        Self {
            username: env::var(USERNAME_ENV).ok(),
            password: env::var(PASSWORD_ENV).ok(),
        }
    }

    /// Whether both the username and the password are configured.
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Name of the index requests are served from, if access is enabled.
    pub fn index_name(&self) -> Option<&str> {
        if self.is_configured() {
            self.username.as_deref()
        } else {
            None
        }
    }

    /// Check a presented username/password pair.
    ///
    /// # Returns
    ///
    /// The index name (the configured username) when both halves match exactly,
    /// `None` otherwise or when access is disabled.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&str> {
        match (&self.username, &self.password) {
            (Some(expected_username), Some(expected_password))
                if expected_username == username && expected_password == password =>
            {
                Some(expected_username.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
