//! Session-held authentication.
//!
//! # Spring Security Equivalent
//! `HttpSessionSecurityContextRepository`, `SessionFixationProtectionStrategy`
//! and `HttpSessionRequestCache`
//!
//! Storage is delegated to `actix-session`; the application must wrap the
//! app in a `SessionMiddleware` *outside* the security middleware.
//!
//! ```rust,ignore
//! App::new()
//!     .wrap(SecurityTransform::new(config))
//!     .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
//! ```

use actix_session::{Session, SessionGetError, SessionInsertError};
use actix_web::ResponseError;
use derive_more::{Display, Error, From};
use tracing::debug;

use crate::http::security::verifier::Principal;

/// What happens to the session id on login.
///
/// # Spring Security Equivalent
/// `sessionManagement().sessionFixation()`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionFixationStrategy {
    /// New session id, attributes kept.
    #[default]
    MigrateSession,
    /// New session id, attributes dropped.
    NewSession,
    /// Keep the id. Leaves the application open to session fixation.
    None,
}

/// Session keys and fixation policy.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    principal_key: String,
    saved_request_key: String,
    fixation_strategy: SessionFixationStrategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        SessionConfig {
            principal_key: "SPRING_SECURITY_CONTEXT".to_string(),
            saved_request_key: "SPRING_SECURITY_SAVED_REQUEST".to_string(),
            fixation_strategy: SessionFixationStrategy::default(),
        }
    }

    pub fn principal_key(mut self, key: &str) -> Self {
        self.principal_key = key.to_string();
        self
    }

    pub fn saved_request_key(mut self, key: &str) -> Self {
        self.saved_request_key = key.to_string();
        self
    }

    pub fn fixation_strategy(mut self, strategy: SessionFixationStrategy) -> Self {
        self.fixation_strategy = strategy;
        self
    }

    pub fn get_principal_key(&self) -> &str {
        &self.principal_key
    }

    pub fn get_saved_request_key(&self) -> &str {
        &self.saved_request_key
    }

    pub fn get_fixation_strategy(&self) -> SessionFixationStrategy {
        self.fixation_strategy
    }

    /// Stores `principal` after applying the fixation strategy.
    pub fn login(&self, session: &Session, principal: &Principal) -> Result<(), SessionError> {
        match self.fixation_strategy {
            SessionFixationStrategy::MigrateSession => session.renew(),
            SessionFixationStrategy::NewSession => {
                session.clear();
                session.renew();
            }
            SessionFixationStrategy::None => {}
        }
        session.insert(&self.principal_key, principal)?;
        Ok(())
    }

    /// Drops every session attribute and invalidates the session cookie.
    pub fn logout(&self, session: &Session) {
        session.purge();
    }

    /// The principal stored by [`login`](Self::login), if any.
    ///
    /// Undecodable entries are treated as absent.
    pub fn principal(&self, session: &Session) -> Option<Principal> {
        session
            .get::<Principal>(&self.principal_key)
            .ok()
            .flatten()
    }

    /// Remembers the URL an anonymous user tried to reach.
    ///
    /// # Spring Equivalent
    /// `RequestCache.saveRequest()`
    ///
    /// URLs that are not local to this host (see [`is_local_url`]) are not
    /// saved.
    pub fn save_request(&self, session: &Session, url: &str) -> Result<(), SessionError> {
        if !is_local_url(url) {
            debug!(%url, "not saving non-local request URL");
            return Ok(());
        }
        session.insert(&self.saved_request_key, url)?;
        Ok(())
    }

    /// Removes and returns the saved URL.
    pub fn take_saved_request(&self, session: &Session) -> Option<String> {
        let saved = session
            .get::<String>(&self.saved_request_key)
            .ok()
            .flatten();
        if saved.is_some() {
            session.remove(&self.saved_request_key);
        }
        saved.filter(|url| is_local_url(url))
    }
}

/// `true` for an absolute path on this host: one leading `/` not followed by
/// another `/` or a `\`. Anything else could redirect to a different host.
pub fn is_local_url(url: &str) -> bool {
    let mut chars = url.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

/// Reading or writing the session failed.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    #[display("session insert failed: {_0}")]
    Insert(SessionInsertError),
    #[display("session read failed: {_0}")]
    Get(SessionGetError),
}

impl ResponseError for SessionError {}
