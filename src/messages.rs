use std::borrow::Cow;

/// A user-facing notification: text plus a category tag that the
/// embedding application can map to styling ("success", "danger", ...).
///
/// Message text may contain positional placeholders (`{0}`, `{1}`, ...)
/// that are substituted by [`Message::format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: Cow<'static, str>,
    category: Cow<'static, str>,
}

impl Message {
    /// Constructs a message with the default category, `"primary"`.
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            text: text.into(),
            category: Cow::Borrowed("primary"),
        }
    }

    /// Replaces the category of this message.
    pub fn with_category(mut self, category: impl Into<Cow<'static, str>>) -> Self {
        self.category = category.into();
        self
    }

    /// The message text, unformatted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Substitutes positional placeholders (`{0}`, `{1}`, ...) with the
    /// provided arguments. Placeholders without a matching argument are
    /// left in place.
    pub fn format(&self, args: &[&str]) -> String {
        let mut text = self.text.to_string();
        for (index, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{index}}}"), arg);
        }
        text
    }
}

impl From<&'static str> for Message {
    fn from(text: &'static str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// The closed set of events that [`Messages`](crate::Messages) holds a
/// notification for. There is no way to register additional keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// a login attempt succeeded
    LoginSuccess,
    /// a login attempt failed
    LoginFailure,
    /// the login form was requested by an already-authenticated client
    AlreadyLoggedIn,
    /// the client logged out
    Logout,
    /// an unauthenticated client requested a protected handler
    LoginRequired,
    /// an authenticated client is not in a gate's allowed-username set
    AccessDenied,
    /// a gate validator rejected the current user
    AuthError,
}

/**
The registry of user-facing notifications.

A `Messages` value is owned by the [`SimpleLogin`](crate::SimpleLogin)
handler it is configured on; there is no process-global message state.
Each key can be overridden with a [`Message`] or plain text, or disabled
entirely with [`Messages::without`]. [`Messages::silenced`] suppresses
every emission while leaving text and categories (and therefore response
bodies and status codes) untouched.

```
use trillium_simple_login::{Message, MessageKey, Messages};

let messages = Messages::new()
    .with(MessageKey::LoginSuccess, "welcome back")
    .with(MessageKey::LoginFailure, Message::new("nope").with_category("warning"))
    .without(MessageKey::Logout);

assert_eq!(messages.get(MessageKey::LoginSuccess).unwrap().text(), "welcome back");
assert_eq!(messages.get(MessageKey::LoginFailure).unwrap().category(), "warning");
assert!(messages.get(MessageKey::Logout).is_none());
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    login_success: Option<Message>,
    login_failure: Option<Message>,
    already_logged_in: Option<Message>,
    logout: Option<Message>,
    login_required: Option<Message>,
    access_denied: Option<Message>,
    auth_error: Option<Message>,
    silenced: bool,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            login_success: Some(Message::new("login success!").with_category("success")),
            login_failure: Some(Message::new("invalid credentials").with_category("danger")),
            already_logged_in: Some(Message::new("already logged in")),
            logout: Some(Message::new("Logged out!")),
            login_required: Some(Message::new("You need to login first").with_category("warning")),
            access_denied: Some(Message::new("Access Denied")),
            auth_error: Some(Message::new("Authentication Error: {0}")),
            silenced: false,
        }
    }
}

impl Messages {
    /// Constructs the default message registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the message for `key`. Plain text becomes a [`Message`]
    /// with the default category.
    pub fn with(mut self, key: MessageKey, message: impl Into<Message>) -> Self {
        *self.slot_mut(key) = Some(message.into());
        self
    }

    /// Disables the message for `key`: nothing will be emitted for that
    /// event, and lookups return `None`.
    pub fn without(mut self, key: MessageKey) -> Self {
        *self.slot_mut(key) = None;
        self
    }

    /// Suppresses emission of every message without discarding text or
    /// categories. Response statuses and redirects are unaffected.
    pub fn silenced(mut self) -> Self {
        self.silenced = true;
        self
    }

    /// Retrieves the message for `key`, if one is set. Lookup never
    /// fails; disabled keys yield `None`.
    pub fn get(&self, key: MessageKey) -> Option<&Message> {
        match key {
            MessageKey::LoginSuccess => self.login_success.as_ref(),
            MessageKey::LoginFailure => self.login_failure.as_ref(),
            MessageKey::AlreadyLoggedIn => self.already_logged_in.as_ref(),
            MessageKey::Logout => self.logout.as_ref(),
            MessageKey::LoginRequired => self.login_required.as_ref(),
            MessageKey::AccessDenied => self.access_denied.as_ref(),
            MessageKey::AuthError => self.auth_error.as_ref(),
        }
    }

    pub(crate) fn emittable(&self, key: MessageKey) -> Option<&Message> {
        if self.silenced {
            None
        } else {
            self.get(key)
        }
    }

    fn slot_mut(&mut self, key: MessageKey) -> &mut Option<Message> {
        match key {
            MessageKey::LoginSuccess => &mut self.login_success,
            MessageKey::LoginFailure => &mut self.login_failure,
            MessageKey::AlreadyLoggedIn => &mut self.already_logged_in,
            MessageKey::Logout => &mut self.logout,
            MessageKey::LoginRequired => &mut self.login_required,
            MessageKey::AccessDenied => &mut self.access_denied,
            MessageKey::AuthError => &mut self.auth_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, MessageKey, Messages};

    #[test]
    fn defaults() {
        let messages = Messages::new();
        assert_eq!(
            messages.get(MessageKey::LoginSuccess),
            Some(&Message::new("login success!").with_category("success"))
        );
        assert_eq!(
            messages.get(MessageKey::AccessDenied).unwrap().category(),
            "primary"
        );
    }

    #[test]
    fn format_substitutes_positional_args() {
        let message = Message::new("Authentication Error: {0}");
        assert_eq!(message.format(&["nasty bug"]), "Authentication Error: nasty bug");
        assert_eq!(message.format(&[]), "Authentication Error: {0}");

        let message = Message::new("{0} and {1} and {0}");
        assert_eq!(message.format(&["a", "b"]), "a and b and a");
    }

    #[test]
    fn silencing_retains_text() {
        let messages = Messages::new().silenced();
        assert!(messages.emittable(MessageKey::LoginSuccess).is_none());
        assert_eq!(
            messages.get(MessageKey::LoginSuccess).unwrap().text(),
            "login success!"
        );
    }

    #[test]
    fn overrides() {
        let messages = Messages::new()
            .with(MessageKey::Logout, "bye")
            .without(MessageKey::LoginRequired);
        assert_eq!(messages.get(MessageKey::Logout).unwrap().text(), "bye");
        assert_eq!(messages.get(MessageKey::Logout).unwrap().category(), "primary");
        assert!(messages.get(MessageKey::LoginRequired).is_none());
        assert!(messages.emittable(MessageKey::Logout).is_some());
    }
}
