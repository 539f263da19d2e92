use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;

pub const CLEANUP_SECRET_HEADER: &str = "x-cleanup-secret";

#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parses an `Authorization` header value of the form `Basic base64(user:password)`.
    /// The password may itself contain colons.
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some(Self {
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse)
    }

    /// Both fields are compared in constant time, and neither short-circuits the other.
    pub fn matches(&self, user: &str, password: &str) -> bool {
        secret_eq(&self.user, user) & secret_eq(&self.password, password)
    }
}

/// Constant-time string equality. Only a length mismatch returns early.
pub fn secret_eq(offered: &str, expected: &str) -> bool {
    offered.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// True when the request carries Basic credentials equal to `user` and `password`.
pub fn basic_auth_ok(headers: &HeaderMap, user: &str, password: &str) -> bool {
    BasicCredentials::from_headers(headers).is_some_and(|c| c.matches(user, password))
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Secret offered for the cleanup endpoint: the dedicated header, a bearer token, then the
/// `secret` query parameter.
pub fn offered_secret<'a>(headers: &'a HeaderMap, query: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(CLEANUP_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| bearer_token(headers))
        .or(query)
}
