//! Extractors for accessing the authenticated principal in handlers.
//!
//! # Spring Equivalent
//! `@AuthenticationPrincipal` annotation / `SecurityContextHolder`

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::SecurityError;
use crate::http::security::verifier::Principal;

/// Extractor for the authenticated principal.
///
/// # Spring Equivalent
/// `@AuthenticationPrincipal` parameter
///
/// # Usage
/// ```ignore
/// async fn profile(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}!", user.get_username())
/// }
/// ```
///
/// # Errors
/// Returns `401 Unauthorized` if the security middleware did not
/// authenticate the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(Principal);

impl AuthenticatedUser {
    pub fn new(principal: Principal) -> Self {
        AuthenticatedUser(principal)
    }

    pub fn into_inner(self) -> Principal {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = SecurityError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Principal>().cloned() {
            Some(principal) => ready(Ok(AuthenticatedUser(principal))),
            None => ready(Err(SecurityError::LoginRequired)),
        }
    }
}

/// Optional extractor for the authenticated principal.
///
/// Yields `None` for anonymous requests instead of failing.
#[derive(Debug, Clone)]
pub struct OptionalUser(Option<Principal>);

impl OptionalUser {
    pub fn into_inner(self) -> Option<Principal> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalUser {
    type Target = Option<Principal>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUser(req.extensions().get::<Principal>().cloned())))
    }
}
