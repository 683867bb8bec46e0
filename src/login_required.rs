use crate::{
    auth_session::AuthSessionMutConnExt,
    basic_auth::{basic_credentials, challenge},
    simple_login_handler::{is_json_request, redirect, simple_login_handle, SimpleLoginHandle},
    MessageKey, SimpleLoginConnExt, Validator,
};
use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt::{self, Debug, Formatter},
};
use trillium::{Conn, Handler, Info, Status, Upgrade};
use url::form_urlencoded;

/**
# Handler gating an inner handler behind a login check.

On each request, a `LoginRequired` decides between running the wrapped
handler, redirecting to the login form, or responding 401/403:

* authenticated and permitted → the inner handler runs
* authenticated but not in a non-empty allowed-username set → 403
* not authenticated → 302 to the login path, with the requested path
  passed along as the `next` query parameter
* with [`with_basic_auth`](LoginRequired::with_basic_auth), requests
  declaring a json content type authenticate through http basic auth
  instead, receiving a 401 challenge on failure

[`Validator`]s added with
[`with_validator`](LoginRequired::with_validator) run in order after
the login check passes; the first rejection responds 403 and the inner
handler is not invoked.

A [`SimpleLogin`](crate::SimpleLogin) handler must run earlier in the
handler sequence, as it supplies the credential checker, messages, and
configuration the gate uses.

```
use trillium::Conn;
use trillium_simple_login::login_required;

let gate = login_required(|conn: Conn| async move { conn.ok("members only") })
    .with_allowed_users(["admin", "jon"]);
```
*/
pub struct LoginRequired<H> {
    handler: H,
    allowed_users: BTreeSet<String>,
    basic: bool,
    validators: Vec<Box<dyn Validator>>,
}

impl<H: Handler> Debug for LoginRequired<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequired")
            .field("handler", &self.handler.name())
            .field("allowed_users", &self.allowed_users)
            .field("basic", &self.basic)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl<H: Handler> LoginRequired<H> {
    /// Constructs a gate around `handler` with no username
    /// restriction, no basic-auth fallback, and no validators.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            allowed_users: BTreeSet::new(),
            basic: false,
            validators: Vec::new(),
        }
    }

    /// Adds a username to the allowed set. Once the set is non-empty,
    /// authenticated users outside it receive a 403.
    pub fn with_allowed_user(mut self, username: impl Into<String>) -> Self {
        self.allowed_users.insert(username.into());
        self
    }

    /// Adds several usernames to the allowed set. See
    /// [`with_allowed_user`](LoginRequired::with_allowed_user).
    pub fn with_allowed_users<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_users
            .extend(usernames.into_iter().map(Into::into));
        self
    }

    /// Authenticates requests that declare a json content type through
    /// http basic auth instead of the session, responding with a 401
    /// challenge when the credentials are missing or invalid.
    pub fn with_basic_auth(mut self) -> Self {
        self.basic = true;
        self
    }

    /// Appends a [`Validator`]. Validators run in the order they were
    /// added and the first rejection short-circuits with a 403.
    pub fn with_validator(mut self, validator: impl Validator) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    async fn validate_and_run(&self, handle: &SimpleLoginHandle, conn: Conn) -> Conn {
        let username = conn.username();
        for validator in &self.validators {
            if let Some(error) = validator.validate(username.as_deref()) {
                let body = handle
                    .0
                    .messages
                    .get(MessageKey::AuthError)
                    .map(|message| message.format(&[error.as_str()]))
                    .unwrap_or(error);
                return conn.with_status(Status::Forbidden).with_body(body).halt();
            }
        }

        self.handler.run(conn).await
    }
}

/// Alias for [`LoginRequired::new`]
pub fn login_required<H: Handler>(handler: H) -> LoginRequired<H> {
    LoginRequired::new(handler)
}

#[trillium::async_trait]
impl<H: Handler> Handler for LoginRequired<H> {
    async fn run(&self, conn: Conn) -> Conn {
        let handle = simple_login_handle(&conn);

        if self.basic && is_json_request(&conn) {
            return match basic_credentials(conn.request_headers()) {
                Some(credentials) if handle.0.check(&credentials) => {
                    let conn = conn.log_in(&credentials.username, true);
                    self.validate_and_run(&handle, conn).await
                }
                _ => challenge(conn),
            };
        }

        if conn.is_logged_in()
            && (self.allowed_users.is_empty()
                || conn.is_logged_in_as(self.allowed_users.iter().map(String::as_str)))
        {
            self.validate_and_run(&handle, conn).await
        } else if conn.is_logged_in() {
            let body = handle
                .0
                .messages
                .get(MessageKey::AccessDenied)
                .map(|message| String::from(message.text()))
                .unwrap_or_default();
            conn.with_status(Status::Forbidden).with_body(body).halt()
        } else {
            let path = conn.path().to_owned();
            let conn = handle.0.flash(conn, MessageKey::LoginRequired);
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("next", &path)
                .finish();
            let location = format!("{}?{}", handle.0.config.login_url, query);
            redirect(conn, &location)
        }
    }

    async fn init(&mut self, info: &mut Info) {
        self.handler.init(info).await;
    }

    async fn before_send(&self, conn: Conn) -> Conn {
        self.handler.before_send(conn).await
    }

    fn has_upgrade(&self, upgrade: &Upgrade) -> bool {
        self.handler.has_upgrade(upgrade)
    }

    async fn upgrade(&self, upgrade: Upgrade) {
        self.handler.upgrade(upgrade).await;
    }

    fn name(&self) -> Cow<'static, str> {
        format!("LoginRequired({})", self.handler.name()).into()
    }
}
