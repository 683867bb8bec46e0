use crate::Credentials;
use base64::{engine::general_purpose::STANDARD, Engine};
use trillium::{Conn, Headers, KnownHeaderName, Status};

pub(crate) fn basic_credentials(headers: &Headers) -> Option<Credentials> {
    let header = headers.get_str(KnownHeaderName::Authorization)?;
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials::new(username, password))
}

pub(crate) fn challenge(conn: Conn) -> Conn {
    conn.with_status(Status::Unauthorized)
        .with_response_header(
            KnownHeaderName::WwwAuthenticate,
            "Basic realm=\"Login Required\"",
        )
        .with_body("Invalid credentials")
        .halt()
}
