//! In-memory credential store.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.provisioning.InMemoryUserDetailsManager`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::http::error::StoreUnavailable;
use crate::http::security::crypto::PasswordEncoder;
use crate::http::security::user::User;
use crate::http::security::verifier::{check_password, CredentialVerifier};

/// Verifier over a fixed map of users built at startup.
///
/// # Spring Security Equivalent
/// `auth.inMemoryAuthentication().withUser("user").password("password").roles("USER")`
///
/// # Example
/// ```
/// use spittr_security_core::http::security::{
///     BCryptPasswordEncoder, InMemoryVerifier, PasswordEncoder, User,
/// };
///
/// let encoder = BCryptPasswordEncoder::with_cost(4);
/// let verifier = InMemoryVerifier::new(encoder.clone())
///     .with_user(User::new("admin", encoder.encode("secret").unwrap()).roles(&["ADMIN"]));
///
/// assert_eq!(verifier.len(), 1);
/// ```
#[derive(Clone)]
pub struct InMemoryVerifier {
    users: HashMap<String, User>,
    password_encoder: Arc<dyn PasswordEncoder>,
}

impl InMemoryVerifier {
    pub fn new<E: PasswordEncoder + 'static>(encoder: E) -> Self {
        InMemoryVerifier {
            users: HashMap::new(),
            password_encoder: Arc::new(encoder),
        }
    }

    /// Adds a user. The first registration of a username wins.
    pub fn with_user(mut self, user: User) -> Self {
        use std::collections::hash_map::Entry;
        match self.users.entry(user.get_username().to_string()) {
            Entry::Occupied(e) => {
                warn!(username = %e.key(), "user already registered, skipping");
            }
            Entry::Vacant(e) => {
                e.insert(user);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryVerifier {
    async fn lookup(&self, username: &str) -> Result<Option<User>, StoreUnavailable> {
        Ok(self.users.get(username).cloned())
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreUnavailable> {
        let user = self.lookup(username).await?;
        Ok(check_password(self.password_encoder.as_ref(), user, password))
    }
}
