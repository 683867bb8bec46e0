use crate::SimpleLoginConfig;
use std::env;

/// A login attempt. Exists only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// the submitted username
    pub username: String,
    /// the submitted password
    pub password: String,
}

impl Credentials {
    /// Constructs a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/**
Decides whether a credential pair is valid.

Implement this for anything that can answer a login attempt, whether a
database-backed user store, an upstream identity provider, or a plain
function. There is a blanket implementation for
`Fn(&Credentials) -> bool`, so the simplest checker is a function:

```
use trillium_simple_login::{Credentials, SimpleLogin};

fn only_chuck_norris_can_enter(credentials: &Credentials) -> bool {
    credentials.username == "chuck" && credentials.password == "norris"
}

let handler = SimpleLogin::new().with_login_checker(only_chuck_norris_can_enter);
```
*/
pub trait LoginChecker: Send + Sync + 'static {
    /// Returns true if the credentials identify a valid user.
    fn check(&self, credentials: &Credentials) -> bool;
}

impl<F> LoginChecker for F
where
    F: Fn(&Credentials) -> bool + Send + Sync + 'static,
{
    fn check(&self, credentials: &Credentials) -> bool {
        self(credentials)
    }
}

/**
The zero-configuration checker used when no
[`LoginChecker`] is supplied: compares against a single pair taken from
the `SIMPLELOGIN_USERNAME` / `SIMPLELOGIN_PASSWORD` environment
variables, falling back to the configured credentials (`admin` /
`secret` unless changed). Environment variables are consulted on every
check and take precedence over the config values.

This is a plaintext comparison with no hashing, no rate limiting, and
no lockout. It exists as a starting point only; do not use it in
production. Supply your own checker with
[`SimpleLogin::with_login_checker`](crate::SimpleLogin::with_login_checker).
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultLoginChecker {
    username: String,
    password: String,
}

impl DefaultLoginChecker {
    /// Constructs a default checker with the fallback credentials from
    /// the provided config.
    pub fn new(config: &SimpleLoginConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl LoginChecker for DefaultLoginChecker {
    fn check(&self, credentials: &Credentials) -> bool {
        let username = env::var("SIMPLELOGIN_USERNAME").unwrap_or_else(|_| self.username.clone());
        let password = env::var("SIMPLELOGIN_PASSWORD").unwrap_or_else(|_| self.password.clone());
        credentials.username == username && credentials.password == password
    }
}
