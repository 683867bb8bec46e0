use std::{env, iter::repeat_with};

/**
Deployment-level settings for [`SimpleLogin`](crate::SimpleLogin).

All settings are optional and default to the values shown in the
builder methods below. [`SimpleLoginConfig::from_env`] additionally
reads `SIMPLELOGIN_`-prefixed environment variables, which is the
configuration surface [`SimpleLogin::new`](crate::SimpleLogin::new)
uses. A config is read-only once the handler it belongs to has been
mounted.

```
use trillium_simple_login::SimpleLoginConfig;

let config = SimpleLoginConfig::new()
    .with_login_url("/signin/")
    .with_home_url("/dashboard/")
    .with_allowed_hosts(["sso.example.com"]);
assert_eq!(config.login_url(), "/signin/");
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleLoginConfig {
    pub(crate) name: String,
    pub(crate) login_url: String,
    pub(crate) logout_url: String,
    pub(crate) home_url: String,
    pub(crate) allowed_hosts: Vec<String>,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Default for SimpleLoginConfig {
    fn default() -> Self {
        Self {
            name: String::from("simplelogin"),
            login_url: String::from("/login/"),
            logout_url: String::from("/logout/"),
            home_url: String::from("/"),
            allowed_hosts: Vec::new(),
            username: String::from("admin"),
            password: String::from("secret"),
        }
    }
}

impl SimpleLoginConfig {
    /// Constructs a config with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /**
    Constructs a config from the environment.

    Recognized variables are `SIMPLELOGIN_BLUEPRINT`,
    `SIMPLELOGIN_LOGIN_URL`, `SIMPLELOGIN_LOGOUT_URL`,
    `SIMPLELOGIN_HOME_URL`, `SIMPLELOGIN_USERNAME`,
    `SIMPLELOGIN_PASSWORD`, and `SIMPLELOGIN_ALLOWED_HOSTS` (a
    comma-separated list of hostnames). Unset or empty variables keep
    their defaults.

    The legacy `SIMPLE_LOGIN_` prefix is still honored for each of
    these, but logs a deprecation warning.
    */
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(name) = env_setting("BLUEPRINT") {
            config.name = name;
        }
        if let Some(login_url) = env_setting("LOGIN_URL") {
            config.login_url = login_url;
        }
        if let Some(logout_url) = env_setting("LOGOUT_URL") {
            config.logout_url = logout_url;
        }
        if let Some(home_url) = env_setting("HOME_URL") {
            config.home_url = home_url;
        }
        if let Some(username) = env_setting("USERNAME") {
            config.username = username;
        }
        if let Some(password) = env_setting("PASSWORD") {
            config.password = password;
        }
        if let Some(hosts) = env_setting("ALLOWED_HOSTS") {
            config.allowed_hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|host| !host.is_empty())
                .map(String::from)
                .collect();
        }
        config
    }

    /// Sets the handler name. This is used as the
    /// [`Handler::name`](trillium::Handler::name) of the
    /// [`SimpleLogin`](crate::SimpleLogin) handler. Default: `simplelogin`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the path the login form is served at and posted to.
    /// Default: `/login/`
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    /// Sets the logout path. Default: `/logout/`
    pub fn with_logout_url(mut self, logout_url: impl Into<String>) -> Self {
        self.logout_url = logout_url.into();
        self
    }

    /// Sets the path clients are redirected to after logout and after
    /// login when no `next` target was provided. Default: `/`
    pub fn with_home_url(mut self, home_url: impl Into<String>) -> Self {
        self.home_url = home_url.into();
        self
    }

    /// Sets the hostnames that are permitted as post-login redirect
    /// targets in addition to the request's own host. Default: none
    pub fn with_allowed_hosts<I, S>(mut self, allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = allowed_hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the credential pair the default login checker compares
    /// against. Default: `admin` / `secret`. The `SIMPLELOGIN_USERNAME`
    /// and `SIMPLELOGIN_PASSWORD` environment variables take precedence
    /// over these values at check time.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// The configured handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured login path.
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// The configured logout path.
    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }

    /// The configured home path.
    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// The configured redirect-target allow list.
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }
}

fn env_setting(suffix: &str) -> Option<String> {
    if let Some(value) = env::var(format!("SIMPLELOGIN_{suffix}"))
        .ok()
        .filter(|value| !value.is_empty())
    {
        return Some(value);
    }

    env::var(format!("SIMPLE_LOGIN_{suffix}"))
        .ok()
        .filter(|value| !value.is_empty())
        .map(|value| {
            log::warn!(
                "settings defined as SIMPLE_LOGIN_{suffix} are deprecated, \
                 please use SIMPLELOGIN_{suffix} instead"
            );
            value
        })
}

/**
Returns the session secret from the `SIMPLELOGIN_SECRET` environment
variable, generating a random one with a loud warning if it is unset.

A generated secret is suitable for
[`SessionHandler`](trillium_sessions::SessionHandler) but changes on
every startup, so sessions will not survive a restart and will not be
shared between processes. Set `SIMPLELOGIN_SECRET` for any multi-process
or restart-persistent deployment.
*/
pub fn session_secret() -> String {
    env::var("SIMPLELOGIN_SECRET")
        .ok()
        .filter(|secret| !secret.is_empty())
        .unwrap_or_else(|| {
            let secret: String = repeat_with(fastrand::alphanumeric).take(64).collect();
            log::warn!(
                "SIMPLELOGIN_SECRET is not set, using a randomly generated session secret. \
                 sessions will not survive a restart and will not be shared between processes"
            );
            secret
        })
}

#[cfg(test)]
mod tests {
    use super::SimpleLoginConfig;
    use std::env;

    #[test]
    fn defaults() {
        let config = SimpleLoginConfig::new();
        assert_eq!(config.name(), "simplelogin");
        assert_eq!(config.login_url(), "/login/");
        assert_eq!(config.logout_url(), "/logout/");
        assert_eq!(config.home_url(), "/");
        assert!(config.allowed_hosts().is_empty());
    }

    #[test]
    fn builder() {
        let config = SimpleLoginConfig::new()
            .with_name("custom")
            .with_login_url("/custom_login/")
            .with_logout_url("/custom_logout/")
            .with_home_url("/custom_home/")
            .with_allowed_hosts(["other.example"]);
        assert_eq!(config.name(), "custom");
        assert_eq!(config.login_url(), "/custom_login/");
        assert_eq!(config.logout_url(), "/custom_logout/");
        assert_eq!(config.home_url(), "/custom_home/");
        assert_eq!(config.allowed_hosts(), ["other.example"]);
    }

    #[test]
    fn environment() {
        env::set_var("SIMPLELOGIN_LOGIN_URL", "/env_login/");
        env::set_var("SIMPLE_LOGIN_LOGOUT_URL", "/legacy_logout/");
        let config = SimpleLoginConfig::from_env();
        assert_eq!(config.login_url(), "/env_login/");
        assert_eq!(config.logout_url(), "/legacy_logout/");
        assert_eq!(config.home_url(), "/");
        env::remove_var("SIMPLELOGIN_LOGIN_URL");
        env::remove_var("SIMPLE_LOGIN_LOGOUT_URL");
    }

    #[test]
    fn allowed_hosts_are_comma_separated() {
        env::set_var("SIMPLELOGIN_ALLOWED_HOSTS", "a.example, b.example,");
        let config = SimpleLoginConfig::from_env();
        assert_eq!(config.allowed_hosts(), ["a.example", "b.example"]);
        env::remove_var("SIMPLELOGIN_ALLOWED_HOSTS");
    }
}
