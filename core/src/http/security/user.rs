//! User model read from the credential stores.
//!
//! # Spring Equivalent
//! `UserDetails` interface

use std::collections::BTreeSet;
use std::fmt;

/// A stored user account.
///
/// Accounts are created and mutated outside this crate; the security layer
/// only reads them. Roles are plain names (`"SPITTER"`, `"ADMIN"`), without
/// the `ROLE_` prefix Spring stores.
///
/// # Example
/// ```
/// use spittr_security_core::http::security::User;
///
/// let user = User::new("alice", "{noop}secret").roles(&["SPITTER", "USER"]);
///
/// assert!(user.has_role("SPITTER"));
/// assert!(user.is_enabled());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    username: String,
    password_hash: String,
    enabled: bool,
    roles: BTreeSet<String>,
}

impl User {
    /// Creates an enabled user with no roles.
    ///
    /// `password_hash` must already be encoded by a
    /// [`PasswordEncoder`](crate::http::security::PasswordEncoder).
    pub fn new(username: &str, password_hash: impl Into<String>) -> Self {
        User {
            username: username.to_string(),
            password_hash: password_hash.into(),
            enabled: true,
            roles: BTreeSet::new(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Adds roles to the user (builder pattern). Duplicates collapse.
    pub fn roles<S: AsRef<str>>(mut self, roles: &[S]) -> Self {
        self.roles
            .extend(roles.iter().map(|role| role.as_ref().to_string()));
        self
    }

    /// Marks the account enabled or disabled (builder pattern).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {{ username: {}, enabled: {}, roles: {:?} }}",
            self.username, self.enabled, self.roles
        )
    }
}
