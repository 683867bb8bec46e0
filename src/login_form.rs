use trillium::Conn;
use trillium_askama::{AskamaConnExt, Template};

/// Everything a login form needs in order to render: the post target,
/// the pending redirect destination, the previously-submitted username
/// for redisplay, and any field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFormContext {
    /// the path the form posts back to
    pub action: String,
    /// the destination to redirect to after a successful login,
    /// carried through a hidden form field
    pub next: String,
    /// the username from a failed submission, for redisplay
    pub username: String,
    /// field validation errors from a failed submission
    pub errors: Vec<String>,
}

/**
Renders the login form.

The provided [`DefaultLoginForm`] serves an unstyled html form;
applications bring their own markup by implementing this trait and
passing the implementation to
[`SimpleLogin::with_form`](crate::SimpleLogin::with_form). The response
status is managed by the login handler, so implementations only supply
body and content type.
*/
pub trait LoginForm: Send + Sync + 'static {
    /// Renders the form described by `context` onto the conn.
    fn render(&self, conn: Conn, context: &LoginFormContext) -> Conn;
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    action: &'a str,
    next: &'a str,
    username: &'a str,
    errors: &'a [String],
}

/// The built-in login form: a minimal html page with username and
/// password fields and a hidden `next` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoginForm {
    _private: (),
}

impl DefaultLoginForm {
    /// Constructs the default login form.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoginForm for DefaultLoginForm {
    fn render(&self, conn: Conn, context: &LoginFormContext) -> Conn {
        conn.render(LoginTemplate {
            action: &context.action,
            next: &context.next,
            username: &context.username,
            errors: &context.errors,
        })
    }
}
