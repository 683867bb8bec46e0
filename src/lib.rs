#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    unused_qualifications
)]

/*!
# Session-based login for trillium.rs

This crate provides a login form, a session-backed authentication
record, and a gating handler that protects other handlers behind a
login check. It builds on [`trillium_sessions`] for storage, so the
handler sequence is always cookies, then sessions, then
[`SimpleLogin`], then your routes:

```
use trillium::Conn;
use trillium_cookies::CookiesHandler;
use trillium_router::Router;
use trillium_sessions::{MemoryStore, SessionHandler};
use trillium_simple_login::{login_required, SimpleLogin, SimpleLoginConnExt};

let handler = (
    CookiesHandler::new(),
    SessionHandler::new(MemoryStore::new(), "please use a real session secret here"),
    SimpleLogin::new(),
    Router::new().get(
        "/secret",
        login_required(|conn: Conn| async move {
            let username = conn.username().unwrap_or_default();
            conn.ok(format!("hello {username}"))
        }),
    ),
);

use trillium_testing::prelude::*;

// unauthenticated requests are redirected to the login form
let conn = get("/secret").on(&handler);
assert_status!(&conn, 302);
assert_eq!(
    conn.inner().response_headers().get_str("location"),
    Some("/login/?next=%2Fsecret")
);

// the login form is served at the configured path
assert_status!(get("/login/").on(&handler), 200);
```

Credential validation is pluggable through the [`LoginChecker`] trait;
the zero-configuration default compares against a single pair
(`admin`/`secret` unless configured otherwise) and must not be used in
production. Messages, the login form, redirect targets, and paths are
all configurable; see [`SimpleLogin`], [`Messages`], and
[`SimpleLoginConfig`].
*/

mod auth_session;
pub use auth_session::AuthSession;

mod basic_auth;

mod checker;
pub use checker::{Credentials, DefaultLoginChecker, LoginChecker};

mod config;
pub use config::{session_secret, SimpleLoginConfig};

mod login_form;
pub use login_form::{DefaultLoginForm, LoginForm, LoginFormContext};

mod login_required;
pub use login_required::{login_required, LoginRequired};

mod messages;
pub use messages::{Message, MessageKey, Messages};

mod simple_login_conn_ext;
pub use simple_login_conn_ext::SimpleLoginConnExt;

mod simple_login_handler;
pub use simple_login_handler::{simple_login, SimpleLogin};

mod validator;
pub use validator::Validator;
