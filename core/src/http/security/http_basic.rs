//! HTTP Basic authentication support.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.web.authentication.www.BasicAuthenticationFilter`

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use base64::prelude::*;

/// Credentials taken from an `Authorization: Basic` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Parses `Authorization: Basic <base64(username:password)>`.
///
/// Returns `None` when the header is absent, uses another scheme or is
/// malformed; such requests are treated as carrying no credentials.
pub fn parse_basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// HTTP Basic configuration.
///
/// # Spring Security Equivalent
/// `HttpSecurity.httpBasic().realmName(..)`
#[derive(Clone, Debug)]
pub struct HttpBasicConfig {
    realm: String,
}

impl HttpBasicConfig {
    /// Default realm is "Realm", as in Spring.
    pub fn new() -> Self {
        HttpBasicConfig {
            realm: "Realm".to_string(),
        }
    }

    pub fn realm(mut self, realm: &str) -> Self {
        self.realm = realm.to_string();
        self
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    /// Value of the `WWW-Authenticate` challenge header.
    pub fn www_authenticate_header(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }
}

impl Default for HttpBasicConfig {
    fn default() -> Self {
        Self::new()
    }
}
