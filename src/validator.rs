/**
A fine-grained authorization predicate for
[`LoginRequired`](crate::LoginRequired) gates, run after the login check
itself has passed.

A validator receives the current username and returns `None` to accept
or `Some(error)` to reject; the error is formatted into the gate's
auth-error message and returned with a 403. Validators run in the order
they were added and the first rejection short-circuits.

There is a blanket implementation for
`Fn(Option<&str>) -> Option<String>`:

```
use trillium::Conn;
use trillium_simple_login::login_required;

fn be_admin(username: Option<&str>) -> Option<String> {
    match username {
        Some("admin") => None,
        _ => Some(String::from("only admins can access this resource")),
    }
}

let gate = login_required(|conn: Conn| async move { conn.ok("hi") }).with_validator(be_admin);
```
*/
pub trait Validator: Send + Sync + 'static {
    /// Returns `None` to accept the current user, or `Some(error)` to
    /// reject with a 403.
    fn validate(&self, username: Option<&str>) -> Option<String>;
}

impl<F> Validator for F
where
    F: Fn(Option<&str>) -> Option<String> + Send + Sync + 'static,
{
    fn validate(&self, username: Option<&str>) -> Option<String> {
        self(username)
    }
}
