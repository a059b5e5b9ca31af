//! services/web/src/web/session.rs
//!
//! Session cookie signing and the small cookie helpers shared by the auth
//! handlers, the route guard and flash notices.

use axum::http::{header, HeaderMap};
use ring::hmac;

/// Name of the cookie carrying the signed auth session id.
pub const SESSION_COOKIE: &str = "session";

/// Signs and verifies session ids with HMAC-SHA256.
///
/// The cookie value is `<session id>.<hex signature>`. A value whose signature
/// does not verify is never looked up in the database.
#[derive(Clone)]
pub struct SessionSigner {
    key: hmac::Key,
}

impl SessionSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    pub fn sign(&self, session_id: &str) -> String {
        let tag = hmac::sign(&self.key, session_id.as_bytes());
        format!("{}.{}", session_id, hex::encode(tag.as_ref()))
    }

    /// Returns the session id if the token's signature is valid.
    pub fn verify<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (session_id, signature) = token.rsplit_once('.')?;
        let tag = hex::decode(signature).ok()?;
        hmac::verify(&self.key, session_id.as_bytes(), &tag).ok()?;
        Some(session_id)
    }
}

/// Finds a cookie value by name across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

/// Builds a `Set-Cookie` value for an HttpOnly, Lax, site-wide cookie.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}
