use std::fmt;
use std::time::Duration;

use crate::transport::DEFAULT_REQUEST_TIMEOUT;

/// How many times an expired session is re-authenticated and the request
/// retried before giving up.
pub const DEFAULT_MAX_SESSION_RETRIES: u32 = 1;

/// Connection and login parameters for one server.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server root URL, e.g. `http://localhost:8018`.
    pub url: String,
    /// Database name sent with the login.
    pub db: String,
    pub username: String,
    pub password: String,
    /// Applied to every HTTP request.
    pub request_timeout: Duration,
    /// Re-authenticate-and-retry budget per request on session expiry.
    pub max_session_retries: u32,
}

impl ClientConfig {
    pub fn new(
        url: impl Into<String>,
        db: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            db: db.into(),
            username: username.into(),
            password: password.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_session_retries: DEFAULT_MAX_SESSION_RETRIES,
        }
    }

    /// Login credentials only, for building the authenticate params.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            db: self.db.clone(),
            login: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("max_session_retries", &self.max_session_retries)
            .finish()
    }
}

/// The `{db, login, password}` triple sent to the login endpoint.
#[derive(Clone, serde::Serialize)]
pub struct Credentials {
    pub db: String,
    pub login: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("db", &self.db)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}
