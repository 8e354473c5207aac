//! CSRF protection.
//!
//! # Spring Security Equivalent
//! `CsrfFilter` with `HttpSessionCsrfTokenRepository`
//!
//! Only verification lives here. Tokens are issued by the application (for
//! example when rendering a form) and stored in the session; state-changing
//! requests must echo the token back in a header.

use std::sync::Arc;

use actix_session::SessionExt;
use actix_web::dev::ServiceRequest;
use actix_web::http::Method;

use crate::http::security::ant_matcher::AntMatchers;
use crate::http::security::crypto::constant_time_eq;
use crate::http::security::middleware::routed_path;

/// Whether `method` can change server state and needs a token.
pub fn requires_csrf(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Checks the CSRF token of a state-changing request.
pub trait CsrfVerifier: Send + Sync {
    fn verify(&self, req: &ServiceRequest) -> bool;
}

/// Compares a request header with the token held in the session.
///
/// # Spring Security Equivalent
/// `HttpSessionCsrfTokenRepository` (header `X-CSRF-TOKEN`)
#[derive(Clone, Debug)]
pub struct SessionCsrfVerifier {
    header_name: String,
    session_key: String,
}

impl Default for SessionCsrfVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCsrfVerifier {
    pub fn new() -> Self {
        SessionCsrfVerifier {
            header_name: "X-CSRF-TOKEN".to_string(),
            session_key: "_csrf".to_string(),
        }
    }

    pub fn header_name(mut self, name: &str) -> Self {
        self.header_name = name.to_string();
        self
    }

    pub fn session_key(mut self, key: &str) -> Self {
        self.session_key = key.to_string();
        self
    }

    pub fn get_session_key(&self) -> &str {
        &self.session_key
    }
}

impl CsrfVerifier for SessionCsrfVerifier {
    fn verify(&self, req: &ServiceRequest) -> bool {
        let Some(sent) = req
            .headers()
            .get(self.header_name.as_str())
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };

        match req.get_session().get::<String>(&self.session_key) {
            Ok(Some(expected)) if !expected.is_empty() => {
                constant_time_eq(expected.as_bytes(), sent.as_bytes())
            }
            _ => false,
        }
    }
}

/// CSRF settings: the verifier plus paths exempt from checking.
///
/// # Spring Security Equivalent
/// `http.csrf().ignoringAntMatchers(..)`
#[derive(Clone)]
pub struct CsrfConfig {
    verifier: Arc<dyn CsrfVerifier>,
    ignored: AntMatchers,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfConfig {
    pub fn new() -> Self {
        CsrfConfig {
            verifier: Arc::new(SessionCsrfVerifier::new()),
            ignored: AntMatchers::new(),
        }
    }

    pub fn verifier<V: CsrfVerifier + 'static>(mut self, verifier: V) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.ignored = self.ignored.add(pattern);
        self
    }

    /// `true` when the request may proceed.
    pub fn check(&self, req: &ServiceRequest) -> bool {
        !requires_csrf(req.method())
            || self.ignored.matches(routed_path(req))
            || self.verifier.verify(req)
    }
}
