//! Directory-service authentication.
//!
//! # Spring Security Equivalent
//! `LdapAuthenticationProvider` with `BindAuthenticator` and
//! `DefaultLdapAuthoritiesPopulator`
//!
//! Only the adapter lives here. Talking to a real directory is the job of a
//! [`DirectoryClient`] implementation supplied by the application; the crate
//! ships [`MockDirectoryClient`] for tests and demos.
//!
//! # Example
//!
//! ```
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use spittr_security_core::http::security::{
//!     CredentialVerifier, DirectoryConfig, DirectoryEntry, DirectoryVerifier, MockDirectoryClient,
//! };
//!
//! let client = MockDirectoryClient::new().with_entry(
//!     DirectoryEntry::new("uid=alice,ou=people,dc=spittr,dc=com", "alice")
//!         .group("cn=spitter,ou=groups,dc=spittr,dc=com"),
//!     "secret",
//! );
//! let verifier = DirectoryVerifier::new(client, DirectoryConfig::new().convert_to_uppercase(true));
//!
//! let result = verifier.verify("alice", "secret").await.unwrap();
//! assert!(result.has_role("SPITTER"));
//! # });
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::http::error::StoreUnavailable;
use crate::http::security::crypto::constant_time_eq;
use crate::http::security::user::User;
use crate::http::security::verifier::CredentialVerifier;

/// A user entry as returned by the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    dn: String,
    uid: String,
    groups: Vec<String>,
    enabled: bool,
}

impl DirectoryEntry {
    pub fn new(dn: &str, uid: &str) -> Self {
        DirectoryEntry {
            dn: dn.to_string(),
            uid: uid.to_string(),
            groups: Vec::new(),
            enabled: true,
        }
    }

    /// Adds a group membership by DN (e.g. `cn=admins,ou=groups,dc=example,dc=com`).
    pub fn group(mut self, group_dn: &str) -> Self {
        self.groups.push(group_dn.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn get_dn(&self) -> &str {
        &self.dn
    }

    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    pub fn get_groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Access to a directory server.
///
/// Both operations return `Err` only when the server cannot be reached.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Searches for the entry of `username`.
    async fn find_user(&self, username: &str) -> Result<Option<DirectoryEntry>, StoreUnavailable>;

    /// Binds as `dn`. `Ok(false)` means the password was rejected.
    async fn bind(&self, dn: &str, password: &str) -> Result<bool, StoreUnavailable>;
}

/// Role mapping options.
#[derive(Clone, Debug, Default)]
pub struct DirectoryConfig {
    role_prefix: String,
    convert_to_uppercase: bool,
}

impl DirectoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix prepended to every role derived from a group.
    pub fn role_prefix(mut self, prefix: &str) -> Self {
        self.role_prefix = prefix.to_string();
        self
    }

    pub fn convert_to_uppercase(mut self, convert: bool) -> Self {
        self.convert_to_uppercase = convert;
        self
    }

    /// Maps a group DN to a role name using its leading `cn=` value.
    fn role_for_group(&self, group_dn: &str) -> Option<String> {
        let first = group_dn.split(',').next()?.trim();
        let (attr, value) = first.split_once('=')?;
        if !attr.trim().eq_ignore_ascii_case("cn") || value.trim().is_empty() {
            return None;
        }

        let value = value.trim();
        let name = if self.convert_to_uppercase {
            value.to_uppercase()
        } else {
            value.to_string()
        };
        Some(format!("{}{}", self.role_prefix, name))
    }
}

/// Verifier that checks passwords by binding to a directory.
///
/// Users produced by this verifier carry an empty password hash: the
/// directory never discloses it. Remember-me tokens are signed over that
/// hash, so [`RememberMeServices`](crate::http::security::RememberMeServices)
/// neither issues nor accepts them for directory users; they stay logged in
/// through the session only.
pub struct DirectoryVerifier<C> {
    client: C,
    config: DirectoryConfig,
}

impl<C: DirectoryClient> DirectoryVerifier<C> {
    pub fn new(client: C, config: DirectoryConfig) -> Self {
        DirectoryVerifier { client, config }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    fn to_user(&self, entry: &DirectoryEntry) -> User {
        let roles: Vec<String> = entry
            .groups
            .iter()
            .filter_map(|group| self.config.role_for_group(group))
            .collect();

        User::new(&entry.uid, String::new())
            .enabled(entry.enabled)
            .roles(&roles)
    }
}

#[async_trait]
impl<C: DirectoryClient> CredentialVerifier for DirectoryVerifier<C> {
    async fn lookup(&self, username: &str) -> Result<Option<User>, StoreUnavailable> {
        let entry = self.client.find_user(username).await.map_err(|e| {
            error!(reason = %e.reason(), "directory search failed");
            e
        })?;
        Ok(entry.map(|entry| self.to_user(&entry)))
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreUnavailable> {
        // Many servers treat an empty password as an anonymous bind and accept it.
        if password.is_empty() {
            debug!(username = %username, "empty password rejected");
            return Ok(None);
        }

        let Some(entry) = self.client.find_user(username).await? else {
            return Ok(None);
        };

        if !entry.enabled {
            return Ok(None);
        }

        if self.client.bind(&entry.dn, password).await? {
            Ok(Some(self.to_user(&entry)))
        } else {
            Ok(None)
        }
    }
}

/// In-memory [`DirectoryClient`].
#[derive(Clone, Default)]
pub struct MockDirectoryClient {
    entries: HashMap<String, (DirectoryEntry, String)>,
    offline: bool,
}

impl MockDirectoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: DirectoryEntry, password: &str) -> Self {
        self.entries
            .insert(entry.uid.clone(), (entry, password.to_string()));
        self
    }

    /// Makes every call fail as if the server were down.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn check_online(&self) -> Result<(), StoreUnavailable> {
        if self.offline {
            Err(StoreUnavailable::new("directory server unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryClient for MockDirectoryClient {
    async fn find_user(&self, username: &str) -> Result<Option<DirectoryEntry>, StoreUnavailable> {
        self.check_online()?;
        Ok(self.entries.get(username).map(|(entry, _)| entry.clone()))
    }

    async fn bind(&self, dn: &str, password: &str) -> Result<bool, StoreUnavailable> {
        self.check_online()?;
        Ok(self
            .entries
            .values()
            .find(|(entry, _)| entry.dn == dn)
            .map(|(_, stored)| constant_time_eq(stored.as_bytes(), password.as_bytes()))
            .unwrap_or(false))
    }
}
