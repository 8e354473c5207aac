//! Credential verification.
//!
//! # Spring Security Equivalent
//! `AuthenticationProvider` / `UserDetailsService` + `DaoAuthenticationProvider`
//!
//! A [`CredentialVerifier`] is a strategy chosen at configuration time:
//! [`InMemoryVerifier`](crate::http::security::InMemoryVerifier),
//! [`JdbcVerifier`](crate::http::security::JdbcVerifier) or
//! [`DirectoryVerifier`](crate::http::security::DirectoryVerifier).

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::error::StoreUnavailable;
use crate::http::security::crypto::PasswordEncoder;
use crate::http::security::user::User;

static NO_ROLES: BTreeSet<String> = BTreeSet::new();

/// Looks up users and checks their passwords.
///
/// "Unknown user" is modelled as `Ok(None)`; `Err` always means the backing
/// store could not be reached and must not be reported as a failed login.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Loads a user by name.
    async fn lookup(&self, username: &str) -> Result<Option<User>, StoreUnavailable>;

    /// Returns the user if it exists, is enabled and `password` matches.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreUnavailable>;

    /// Verifies a username/password pair.
    ///
    /// # Example
    /// ```
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use spittr_security_core::http::security::{
    ///     CredentialVerifier, InMemoryVerifier, NoOpPasswordEncoder, User,
    /// };
    ///
    /// let verifier = InMemoryVerifier::new(NoOpPasswordEncoder)
    ///     .with_user(User::new("alice", "secret").roles(&["SPITTER"]));
    ///
    /// let result = verifier.verify("alice", "secret").await.unwrap();
    /// assert!(result.is_authenticated());
    /// assert!(result.has_role("SPITTER"));
    /// # });
    /// ```
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticationResult, StoreUnavailable> {
        Ok(self
            .authenticate(username, password)
            .await?
            .map(|user| AuthenticationResult::from(&user))
            .unwrap_or_default())
    }
}

/// Password check shared by the hash-based verifiers.
///
/// For unknown users a throw-away hash is still computed so the response
/// time does not reveal whether the username exists.
pub fn check_password(
    encoder: &dyn PasswordEncoder,
    user: Option<User>,
    password: &str,
) -> Option<User> {
    match user {
        Some(user) if encoder.matches(password, user.get_password_hash()) => {
            Some(user).filter(User::is_enabled)
        }
        Some(_) => None,
        None => {
            let _ = encoder.encode(password);
            None
        }
    }
}

/// The identity attached to an authenticated request.
///
/// Stored in the session after login and in request extensions for
/// handlers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    username: String,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(username: &str, roles: BTreeSet<String>) -> Self {
        Principal {
            username: username.to_string(),
            roles,
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal::new(user.get_username(), user.get_roles().clone())
    }
}

/// Outcome of authenticating one request.
///
/// Unauthenticated results never carry roles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthenticationResult {
    principal: Option<Principal>,
}

impl AuthenticationResult {
    /// A request with no (valid) credentials.
    pub fn anonymous() -> Self {
        AuthenticationResult { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        AuthenticationResult {
            principal: Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        self.principal
            .as_ref()
            .map(Principal::get_roles)
            .unwrap_or(&NO_ROLES)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(role)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn into_principal(self) -> Option<Principal> {
        self.principal
    }
}

impl From<&User> for AuthenticationResult {
    fn from(user: &User) -> Self {
        AuthenticationResult::authenticated(Principal::from(user))
    }
}
