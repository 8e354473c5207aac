//! Remember-me authentication.
//!
//! # Spring Security Equivalent
//! `TokenBasedRememberMeServices`
//!
//! The cookie holds `base64(username:expiry:signature)` where
//! `signature = hex(sha256(username:expiry:password_hash:key))`. Because the
//! stored password hash is part of the signature, changing the password
//! invalidates every outstanding token for that user.
//!
//! # Example
//! ```ignore
//! let remember_me = RememberMeServices::new(
//!     RememberMeConfig::new("token").token_validity_seconds(2_419_200),
//! );
//!
//! // after a successful form login with the checkbox ticked
//! let cookie = remember_me.login_success(&user);
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::cookie::{Cookie, SameSite};
use base64::prelude::*;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::http::error::StoreUnavailable;
use crate::http::security::crypto::constant_time_eq;
use crate::http::security::user::User;
use crate::http::security::verifier::{CredentialVerifier, Principal};

/// Remember-me configuration.
///
/// # Spring Security Equivalent
/// `RememberMeConfigurer`
#[derive(Clone, Debug)]
pub struct RememberMeConfig {
    key: String,
    token_validity: Duration,
    cookie_name: String,
    cookie_path: String,
    cookie_domain: Option<String>,
    cookie_secure: bool,
    cookie_http_only: bool,
    cookie_same_site: SameSite,
    parameter_name: String,
    always_remember: bool,
}

impl RememberMeConfig {
    /// Creates a configuration signing tokens with `key`.
    ///
    /// Tokens are valid for 14 days unless configured otherwise.
    pub fn new(key: &str) -> Self {
        RememberMeConfig {
            key: key.to_string(),
            token_validity: Duration::from_secs(14 * 24 * 60 * 60),
            cookie_name: "remember-me".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
            parameter_name: "remember-me".to_string(),
            always_remember: false,
        }
    }

    pub fn token_validity_seconds(mut self, seconds: u64) -> Self {
        self.token_validity = Duration::from_secs(seconds);
        self
    }

    pub fn token_validity_days(mut self, days: u64) -> Self {
        self.token_validity = Duration::from_secs(days.saturating_mul(24 * 60 * 60));
        self
    }

    pub fn cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = name.to_string();
        self
    }

    pub fn cookie_path(mut self, path: &str) -> Self {
        self.cookie_path = path.to_string();
        self
    }

    pub fn cookie_domain(mut self, domain: &str) -> Self {
        self.cookie_domain = Some(domain.to_string());
        self
    }

    /// Sends the cookie over HTTPS only (default `true`).
    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    pub fn cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    /// Name of the login form checkbox.
    pub fn parameter_name(mut self, name: &str) -> Self {
        self.parameter_name = name.to_string();
        self
    }

    /// Issue a token on every login regardless of the checkbox.
    pub fn always_remember(mut self, always: bool) -> Self {
        self.always_remember = always;
        self
    }

    pub fn get_key(&self) -> &str {
        &self.key
    }

    pub fn get_token_validity(&self) -> Duration {
        self.token_validity
    }

    pub fn get_cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn get_parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub fn is_always_remember(&self) -> bool {
        self.always_remember
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Decoded remember-me cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RememberMeToken {
    pub username: String,
    /// Seconds since the UNIX epoch.
    pub expiry: u64,
    pub signature: String,
}

impl RememberMeToken {
    /// Signs a token for `user` expiring at `expiry`.
    pub fn new(user: &User, expiry: u64, key: &str) -> Self {
        RememberMeToken {
            username: user.get_username().to_string(),
            expiry,
            signature: Self::signature(user.get_username(), expiry, user.get_password_hash(), key),
        }
    }

    fn signature(username: &str, expiry: u64, password_hash: &str, key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:{}:{}", username, expiry, password_hash, key));
        hex::encode(hasher.finalize())
    }

    pub fn encode(&self) -> String {
        BASE64_STANDARD.encode(format!("{}:{}:{}", self.username, self.expiry, self.signature))
    }

    /// Parses a cookie value. Usernames may contain `:`.
    pub fn decode(encoded: &str) -> Option<Self> {
        let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
        let data = String::from_utf8(decoded).ok()?;

        let mut parts = data.rsplitn(3, ':');
        let signature = parts.next()?;
        let expiry = parts.next()?.parse().ok()?;
        let username = parts.next()?;
        if username.is_empty() || signature.is_empty() {
            return None;
        }

        Some(RememberMeToken {
            username: username.to_string(),
            expiry,
            signature: signature.to_string(),
        })
    }

    pub fn is_expired(&self) -> bool {
        now_secs() > self.expiry
    }

    /// Checks expiry and the signature against the user's current password
    /// hash.
    pub fn is_valid_for(&self, user: &User, key: &str) -> bool {
        if self.is_expired() || user.get_username() != self.username {
            return false;
        }
        let expected =
            Self::signature(&self.username, self.expiry, user.get_password_hash(), key);
        constant_time_eq(expected.as_bytes(), self.signature.as_bytes())
    }
}

/// Issues, validates and clears remember-me cookies.
///
/// # Spring Security Equivalent
/// `RememberMeServices`
#[derive(Clone, Debug)]
pub struct RememberMeServices {
    config: RememberMeConfig,
}

impl RememberMeServices {
    pub fn new(config: RememberMeConfig) -> Self {
        RememberMeServices { config }
    }

    pub fn config(&self) -> &RememberMeConfig {
        &self.config
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Whether a login form submission asked to be remembered.
    pub fn is_requested(&self, checkbox: Option<&str>) -> bool {
        self.config.always_remember
            || matches!(
                checkbox.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
                Some("on" | "true" | "yes" | "1")
            )
    }

    /// Whether tokens can be issued for `user`.
    ///
    /// The signature covers the password hash, so a user without one (as
    /// produced by a directory bind) has no per-user secret and is refused.
    pub fn supports(&self, user: &User) -> bool {
        !user.get_password_hash().is_empty()
    }

    /// Cookie to set after a successful login.
    ///
    /// # Spring Equivalent
    /// `RememberMeServices.loginSuccess()`
    pub fn login_success(&self, user: &User) -> Cookie<'static> {
        let expiry = now_secs().saturating_add(self.config.token_validity.as_secs());
        let token = RememberMeToken::new(user, expiry, &self.config.key);
        let max_age = actix_web::cookie::time::Duration::seconds(
            i64::try_from(self.config.token_validity.as_secs()).unwrap_or(i64::MAX),
        );

        self.cookie(token.encode(), max_age)
    }

    /// Resolves a cookie value to a principal.
    ///
    /// `Ok(None)` for malformed, expired, forged or stale tokens and for
    /// unknown, disabled or [unsupported](Self::supports) users; the caller
    /// should clear the cookie.
    ///
    /// # Spring Equivalent
    /// `RememberMeServices.autoLogin()`
    pub async fn auto_login(
        &self,
        cookie_value: &str,
        verifier: &dyn CredentialVerifier,
    ) -> Result<Option<Principal>, StoreUnavailable> {
        let Some(token) = RememberMeToken::decode(cookie_value) else {
            debug!("malformed remember-me cookie");
            return Ok(None);
        };
        if token.is_expired() {
            debug!(username = %token.username, "expired remember-me cookie");
            return Ok(None);
        }

        let Some(user) = verifier.lookup(&token.username).await? else {
            return Ok(None);
        };
        if !self.supports(&user) {
            debug!(username = %token.username, "remember-me unsupported for user without password hash");
            return Ok(None);
        }
        if !user.is_enabled() || !token.is_valid_for(&user, &self.config.key) {
            debug!(username = %token.username, "remember-me cookie rejected");
            return Ok(None);
        }

        Ok(Some(Principal::from(&user)))
    }

    /// Cookie that removes the remember-me token.
    ///
    /// # Spring Equivalent
    /// `RememberMeServices.logout()`
    pub fn logout(&self) -> Cookie<'static> {
        self.cookie(String::new(), actix_web::cookie::time::Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: actix_web::cookie::time::Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.config.cookie_name.clone(), value)
            .path(self.config.cookie_path.clone())
            .max_age(max_age)
            .http_only(self.config.cookie_http_only)
            .secure(self.config.cookie_secure)
            .same_site(self.config.cookie_same_site);

        if let Some(domain) = &self.config.cookie_domain {
            cookie = cookie.domain(domain.clone());
        }

        cookie.finish()
    }
}
