use crate::{
    auth_session::AuthSessionMutConnExt,
    basic_auth::{basic_credentials, challenge},
    login_form::{DefaultLoginForm, LoginForm, LoginFormContext},
    Credentials, DefaultLoginChecker, LoginChecker, MessageKey, Messages, SimpleLoginConfig,
    SimpleLoginConnExt,
};
use mime::Mime;
use querystrong::QueryStrong;
use serde::Deserialize;
use std::{
    borrow::Cow,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use trillium::{conn_try, Conn, Handler, KnownHeaderName, Method, Status};
use url::Url;

/**
# Handler providing the login and logout routes.

`SimpleLogin` serves a login form (`GET`) and processes submissions
(`POST`) at the configured login path, and clears authentication state
at the configured logout path. Any other request passes through
untouched, so this handler is mounted once, after
[`SessionHandler`](trillium_sessions::SessionHandler) and before the
application's routes.

On every request it also makes its configuration, message registry, and
credential checker available to downstream
[`LoginRequired`](crate::LoginRequired) gates through the conn's state,
so it must run earlier in the handler sequence than any gate.

See the crate-level docs for a complete example.
*/
pub struct SimpleLogin {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) config: SimpleLoginConfig,
    pub(crate) messages: Messages,
    checker: Option<Box<dyn LoginChecker>>,
    form: Box<dyn LoginForm>,
    on_logout: Vec<Box<dyn Fn() + Send + Sync + 'static>>,
}

/// conn-state handle through which gates reach the mounted
/// [`SimpleLogin`], in the manner of other trillium ConnExt state.
#[derive(Clone)]
pub(crate) struct SimpleLoginHandle(pub(crate) Arc<Inner>);

pub(crate) fn simple_login_handle(conn: &Conn) -> SimpleLoginHandle {
    conn.state::<SimpleLoginHandle>()
        .cloned()
        .expect("SimpleLogin must be mounted before login_required gates are run")
}

#[derive(Debug, Default, Deserialize)]
struct LoginSubmission {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    next: Option<String>,
}

impl Debug for SimpleLogin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleLogin")
            .field("config", &self.inner.config)
            .field("messages", &self.inner.messages)
            .field(
                "checker",
                &if self.inner.checker.is_some() {
                    "Some(login checker)"
                } else {
                    "None (default checker)"
                },
            )
            .field("on_logout", &self.inner.on_logout.len())
            .finish()
    }
}

impl Default for SimpleLogin {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleLogin {
    /**
    Constructs a SimpleLogin handler configured from
    [`SimpleLoginConfig::from_env`], with the default message registry,
    the default login form, and the default credential checker.

    The default checker compares against a single configured pair and
    is not suitable for production use; see
    [`DefaultLoginChecker`](crate::DefaultLoginChecker) and supply your
    own checker with [`SimpleLogin::with_login_checker`].
    */
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                config: SimpleLoginConfig::from_env(),
                messages: Messages::new(),
                checker: None,
                form: Box::new(DefaultLoginForm::new()),
                on_logout: Vec::new(),
            }),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: SimpleLoginConfig) -> Self {
        self.inner_mut().config = config;
        self
    }

    /// Replaces the credential checker.
    pub fn with_login_checker(mut self, checker: impl LoginChecker) -> Self {
        self.inner_mut().checker = Some(Box::new(checker));
        self
    }

    /// Replaces the message registry.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.inner_mut().messages = messages;
        self
    }

    /// Replaces the login form.
    pub fn with_form(mut self, form: impl LoginForm) -> Self {
        self.inner_mut().form = Box::new(form);
        self
    }

    /// Registers a callback to be invoked on every logout, after the
    /// session's authentication record has been cleared. Callbacks run
    /// in registration order; panics propagate.
    pub fn on_logout(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.inner_mut().on_logout.push(Box::new(callback));
        self
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::get_mut(&mut self.inner)
            .expect("SimpleLogin cannot be reconfigured after it has been mounted")
    }
}

/// Alias for [`SimpleLogin::new`]
pub fn simple_login() -> SimpleLogin {
    SimpleLogin::new()
}

#[trillium::async_trait]
impl Handler for SimpleLogin {
    async fn run(&self, mut conn: Conn) -> Conn {
        assert!(
            conn.state::<SimpleLoginHandle>().is_none(),
            "SimpleLogin is already mounted on this application; mount it exactly once"
        );
        conn.set_state(SimpleLoginHandle(Arc::clone(&self.inner)));

        let path = conn.path().to_owned();
        if path == self.inner.config.login_url
            && matches!(conn.method(), Method::Get | Method::Post)
        {
            self.inner.login(conn).await
        } else if path == self.inner.config.logout_url && conn.method() == Method::Get {
            self.inner.logout(conn).await
        } else {
            conn
        }
    }

    fn name(&self) -> Cow<'static, str> {
        self.inner.config.name.clone().into()
    }
}

impl Inner {
    pub(crate) fn check(&self, credentials: &Credentials) -> bool {
        match &self.checker {
            Some(checker) => checker.check(credentials),
            None => DefaultLoginChecker::new(&self.config).check(credentials),
        }
    }

    pub(crate) fn flash(&self, conn: Conn, key: MessageKey) -> Conn {
        match self.messages.emittable(key) {
            Some(message) => conn.push_flash(message.category(), message.text()),
            None => conn,
        }
    }

    async fn login(&self, mut conn: Conn) -> Conn {
        let query_next = QueryStrong::parse_strict(conn.querystring())
            .ok()
            .and_then(|query| query.get_str("next").map(String::from));

        let submission = if conn.method() == Method::Post && is_form_request(&conn) {
            let body = conn_try!(conn.request_body_string().await, conn);
            serde_urlencoded::from_str(&body).unwrap_or_default()
        } else {
            LoginSubmission::default()
        };

        // precedence: query parameter, then form field, then home url
        let destiny = query_next
            .or_else(|| submission.next.clone())
            .unwrap_or_else(|| self.config.home_url.clone());

        if !self.redirect_target_allowed(&conn, &destiny) {
            return conn
                .with_status(Status::BadRequest)
                .with_body("Invalid next url, can only redirect to the same host")
                .halt();
        }

        if conn.is_logged_in() {
            let conn = self.flash(conn, MessageKey::AlreadyLoggedIn);
            return redirect(conn, &destiny);
        }

        // alternate credential path for json clients; prefer gating
        // handlers with `login_required(..).with_basic_auth()` instead
        if is_json_request(&conn) {
            return match basic_credentials(conn.request_headers()) {
                Some(credentials) if self.check(&credentials) => {
                    let conn = conn.log_in(&credentials.username, true);
                    redirect(conn, &destiny)
                }
                _ => challenge(conn),
            };
        }

        if conn.method() == Method::Post {
            let username = submission.username.unwrap_or_default();
            let password = submission.password.unwrap_or_default();

            let mut errors = Vec::new();
            if username.trim().is_empty() {
                errors.push(String::from("name: This field is required."));
            }
            if password.trim().is_empty() {
                errors.push(String::from("password: This field is required."));
            }

            if !errors.is_empty() {
                let context = self.form_context(destiny, username, errors);
                return self.render_form(conn, Status::Ok, &context);
            }

            let credentials = Credentials::new(username, password);
            if self.check(&credentials) {
                let conn = self.flash(conn, MessageKey::LoginSuccess);
                let conn = conn.log_in(&credentials.username, false);
                return redirect(conn, &destiny);
            }

            let conn = self.flash(conn, MessageKey::LoginFailure);
            let context = self.form_context(destiny, credentials.username, Vec::new());
            // 401 communicates the failed credentials, with the form as body
            return self.render_form(conn, Status::Unauthorized, &context);
        }

        let context = self.form_context(destiny, String::new(), Vec::new());
        self.render_form(conn, Status::Ok, &context)
    }

    async fn logout(&self, mut conn: Conn) -> Conn {
        conn.log_out();
        let conn = self.flash(conn, MessageKey::Logout);

        for callback in &self.on_logout {
            callback();
        }

        redirect(conn, &self.config.home_url)
    }

    fn form_context(&self, next: String, username: String, errors: Vec<String>) -> LoginFormContext {
        LoginFormContext {
            action: self.config.login_url.clone(),
            next,
            username,
            errors,
        }
    }

    fn render_form(&self, conn: Conn, status: Status, context: &LoginFormContext) -> Conn {
        self.form.render(conn, context).with_status(status)
    }

    /// a redirect target is acceptable when it resolves to the
    /// request's own host or to an explicitly allow-listed one
    fn redirect_target_allowed(&self, conn: &Conn, destiny: &str) -> bool {
        let scheme = if conn.is_secure() { "https" } else { "http" };
        let host = conn
            .request_headers()
            .get_str(KnownHeaderName::Host)
            .unwrap_or("localhost");

        let base = match Url::parse(&format!("{scheme}://{host}/")) {
            Ok(base) => base,
            Err(_) => return false,
        };
        let target = match base.join(destiny) {
            Ok(target) => target,
            Err(_) => return false,
        };

        netloc(&target) == netloc(&base)
            || self
                .config
                .allowed_hosts
                .iter()
                .any(|allowed| *allowed == netloc(&target))
    }
}

fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => String::from(host),
    }
}

pub(crate) fn redirect(conn: Conn, location: &str) -> Conn {
    conn.with_status(Status::Found)
        .with_response_header(KnownHeaderName::Location, String::from(location))
        .halt()
}

fn content_type(conn: &Conn) -> Option<Mime> {
    conn.request_headers()
        .get_str(KnownHeaderName::ContentType)
        .and_then(|header| header.parse().ok())
}

pub(crate) fn is_json_request(conn: &Conn) -> bool {
    content_type(conn).map_or(false, |mime| {
        mime.suffix().unwrap_or_else(|| mime.subtype()).as_str() == "json"
    })
}

fn is_form_request(conn: &Conn) -> bool {
    content_type(conn).map_or(false, |mime| {
        mime.suffix().unwrap_or_else(|| mime.subtype()).as_str() == "x-www-form-urlencoded"
    })
}
