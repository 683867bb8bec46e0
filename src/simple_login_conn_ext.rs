use crate::auth_session::{AuthSession, AUTH_SESSION_KEY, FLASHES_SESSION_KEY};
use trillium::Conn;
use trillium_sessions::SessionConnExt;

/**
Extension trait adding authentication queries to [`Conn`].

[`SessionHandler`](trillium_sessions::SessionHandler) **MUST** run on
the conn before any of these functions are called.
*/
pub trait SimpleLoginConnExt {
    /// Retrieves the current authentication record, or the default
    /// (unauthenticated) record if none is stored.
    fn auth_session(&self) -> AuthSession;

    /// True if this client has logged in.
    fn is_logged_in(&self) -> bool;

    /// True if this client has logged in as one of the provided
    /// usernames.
    fn is_logged_in_as<'a>(&self, usernames: impl IntoIterator<Item = &'a str>) -> bool;

    /// The current authenticated username, if any.
    fn username(&self) -> Option<String>;

    /// True if this client authenticated through http basic auth
    /// rather than the login form.
    fn logged_in_via_basic_auth(&self) -> bool;

    /// Removes and returns all pending `(category, text)` notification
    /// pairs flashed by the login, logout, and gate flows, oldest
    /// first. Applications render these however they see fit.
    fn take_flashes(&mut self) -> Vec<(String, String)>;
}

impl SimpleLoginConnExt for Conn {
    fn auth_session(&self) -> AuthSession {
        self.session().get(AUTH_SESSION_KEY).unwrap_or_default()
    }

    fn is_logged_in(&self) -> bool {
        self.auth_session().is_authenticated()
    }

    fn is_logged_in_as<'a>(&self, usernames: impl IntoIterator<Item = &'a str>) -> bool {
        let auth_session = self.auth_session();
        match auth_session.username.as_deref() {
            Some(current) if auth_session.is_authenticated() => {
                usernames.into_iter().any(|username| username == current)
            }
            _ => false,
        }
    }

    fn username(&self) -> Option<String> {
        self.auth_session().username
    }

    fn logged_in_via_basic_auth(&self) -> bool {
        let auth_session = self.auth_session();
        auth_session.is_authenticated() && auth_session.via_basic_auth
    }

    fn take_flashes(&mut self) -> Vec<(String, String)> {
        let flashes = self.session().get(FLASHES_SESSION_KEY).unwrap_or_default();
        self.session_mut().remove(FLASHES_SESSION_KEY);
        flashes
    }
}
