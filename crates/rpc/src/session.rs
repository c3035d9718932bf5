//! Authenticated session state.
//!
//! The session token itself travels as a cookie held by the transport;
//! this struct records what the login call returned so the client can
//! tell whether model calls are allowed.

/// Server-assigned login state. Owned by exactly one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    uid: Option<i64>,
    session_id: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }

    pub fn uid(&self) -> Option<i64> {
        self.uid
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Replace the session in place after a successful login.
    pub fn establish(&mut self, uid: i64, session_id: Option<String>) {
        self.uid = Some(uid);
        self.session_id = session_id;
    }

    /// Forget the login, e.g. when the server reports expiry.
    pub fn invalidate(&mut self) {
        self.uid = None;
        self.session_id = None;
    }
}
