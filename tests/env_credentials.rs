// environment-variable credential overrides live in their own test
// binary so the env mutation cannot race the other tests.

use trillium::{Conn, Handler};
use trillium_cookies::CookiesHandler;
use trillium_router::Router;
use trillium_sessions::{MemoryStore, SessionHandler};
use trillium_simple_login::{login_required, SimpleLogin, SimpleLoginConnExt};
use trillium_testing::prelude::*;

const SECRET: &str = "0123456789abcdef0123456789abcdef01234567";

fn app() -> impl Handler {
    (
        CookiesHandler::new(),
        SessionHandler::new(MemoryStore::new(), SECRET),
        SimpleLogin::new(),
        Router::new().get(
            "/whoami",
            login_required(|conn: Conn| async move {
                let username = conn.username().unwrap_or_default();
                conn.ok(username)
            }),
        ),
    )
}

#[test]
fn environment_credentials_take_precedence_over_config() {
    std::env::set_var("SIMPLELOGIN_USERNAME", "keeper");
    std::env::set_var("SIMPLELOGIN_PASSWORD", "of the bridge");

    let handler = app();

    // the config defaults no longer match
    assert_status!(
        post("/login/")
            .with_request_header("content-type", "application/x-www-form-urlencoded")
            .with_request_body("username=admin&password=secret")
            .on(&handler),
        401
    );

    let conn = post("/login/")
        .with_request_header("content-type", "application/x-www-form-urlencoded")
        .with_request_body("username=keeper&password=of+the+bridge")
        .on(&handler);
    assert_status!(&conn, 302);

    let set_cookie = conn
        .inner().response_headers()
        .get_str("set-cookie")
        .expect("response should carry a session cookie");
    let cookie = trillium_cookies::cookie::Cookie::parse_encoded(set_cookie).unwrap();
    assert_ok!(
        get("/whoami")
            .with_request_header("cookie", format!("{}={}", cookie.name(), cookie.value()))
            .on(&handler),
        "keeper"
    );

    std::env::remove_var("SIMPLELOGIN_USERNAME");
    std::env::remove_var("SIMPLELOGIN_PASSWORD");
}
