use serde::{Deserialize, Serialize};
use trillium::Conn;
use trillium_sessions::SessionConnExt;

pub(crate) const AUTH_SESSION_KEY: &str = "simplelogin.auth";
pub(crate) const FLASHES_SESSION_KEY: &str = "simplelogin.flashes";

/**
The per-client authentication record, stored in the session managed by
[`trillium_sessions::SessionHandler`].

A session counts as authenticated only when `authenticated` is true
*and* a username is present. Only the login handler (form submission or
basic-auth) writes an authenticated record; logout and session expiry
clear it.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// whether this client has logged in
    pub authenticated: bool,
    /// the authenticated username, if any
    pub username: Option<String>,
    /// whether authentication happened through http basic auth rather
    /// than the login form
    pub via_basic_auth: bool,
}

impl AuthSession {
    /// True iff `authenticated` is set and a username is present.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.username.is_some()
    }

    pub(crate) fn logged_in(username: &str, via_basic_auth: bool) -> Self {
        Self {
            authenticated: true,
            username: Some(String::from(username)),
            via_basic_auth,
        }
    }
}

/// crate-internal session mutations. only the login and logout flows
/// may write authentication state.
pub(crate) trait AuthSessionMutConnExt {
    fn log_in(self, username: &str, via_basic_auth: bool) -> Self;
    fn log_out(&mut self);
    fn push_flash(self, category: &str, text: &str) -> Self;
}

impl AuthSessionMutConnExt for Conn {
    fn log_in(self, username: &str, via_basic_auth: bool) -> Self {
        self.with_session(
            AUTH_SESSION_KEY,
            AuthSession::logged_in(username, via_basic_auth),
        )
    }

    fn log_out(&mut self) {
        self.session_mut().remove(AUTH_SESSION_KEY);
    }

    fn push_flash(self, category: &str, text: &str) -> Self {
        let mut flashes: Vec<(String, String)> =
            self.session().get(FLASHES_SESSION_KEY).unwrap_or_default();
        flashes.push((String::from(category), String::from(text)));
        self.with_session(FLASHES_SESSION_KEY, flashes)
    }
}
