//! Relational user store.
//!
//! # Spring Security Equivalent
//! `JdbcUserDetailsManager` configured through
//! `auth.jdbcAuthentication().usersByUsernameQuery(..).authoritiesByUsernameQuery(..)`
//!
//! # Feature Flag
//! Requires the `jdbc` feature (enabled by default).
//!
//! Creating and migrating the tables is the application's job; this module
//! only reads them.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::error;

use crate::http::error::StoreUnavailable;
use crate::http::security::crypto::PasswordEncoder;
use crate::http::security::user::User;
use crate::http::security::verifier::{check_password, CredentialVerifier};

/// Default query returning `(username, password_hash, enabled)`.
pub const DEFAULT_USERS_BY_USERNAME_QUERY: &str =
    "SELECT username, password_hash, enabled FROM users WHERE username = ?";

/// Default query returning one `role` per row.
pub const DEFAULT_ROLES_BY_USERNAME_QUERY: &str =
    "SELECT role FROM user_roles WHERE username = ?";

/// Verifier backed by a SQL database.
///
/// Both queries take the username as their single bind parameter. The users
/// query must return the username, the encoded password and an enabled flag,
/// in that column order; the roles query returns role names in its first
/// column.
///
/// # Example
/// ```ignore
/// let pool = SqlitePool::connect("sqlite://spittr.db").await?;
/// let verifier = JdbcVerifier::new(pool, BCryptPasswordEncoder::new())
///     .users_by_username_query("SELECT username, password, active FROM spitter WHERE username = ?")
///     .roles_by_username_query("SELECT authority FROM spitter_authority WHERE username = ?");
/// ```
#[derive(Clone)]
pub struct JdbcVerifier {
    pool: SqlitePool,
    password_encoder: Arc<dyn PasswordEncoder>,
    users_query: String,
    roles_query: String,
    role_prefix: Option<String>,
}

impl JdbcVerifier {
    pub fn new<E: PasswordEncoder + 'static>(pool: SqlitePool, encoder: E) -> Self {
        JdbcVerifier {
            pool,
            password_encoder: Arc::new(encoder),
            users_query: DEFAULT_USERS_BY_USERNAME_QUERY.to_string(),
            roles_query: DEFAULT_ROLES_BY_USERNAME_QUERY.to_string(),
            role_prefix: Some("ROLE_".to_string()),
        }
    }

    pub fn users_by_username_query(mut self, query: &str) -> Self {
        self.users_query = query.to_string();
        self
    }

    pub fn roles_by_username_query(mut self, query: &str) -> Self {
        self.roles_query = query.to_string();
        self
    }

    /// Prefix stripped from stored role names (default `ROLE_`).
    ///
    /// `None` keeps stored names untouched.
    pub fn role_prefix(mut self, prefix: Option<&str>) -> Self {
        self.role_prefix = prefix.map(str::to_string);
        self
    }

    fn role_name(&self, stored: String) -> String {
        match &self.role_prefix {
            Some(prefix) => stored
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
                .unwrap_or(stored),
            None => stored,
        }
    }

    async fn load_user(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(&self.users_query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row.try_get(0)?;
        let password_hash: String = row.try_get(1)?;
        let enabled: bool = row.try_get(2)?;

        let roles = sqlx::query(&self.roles_query)
            .bind(username)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|r| r.try_get::<String, _>(0).map(|role| self.role_name(role)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(
            User::new(&name, password_hash)
                .enabled(enabled)
                .roles(&roles),
        ))
    }
}

#[async_trait]
impl CredentialVerifier for JdbcVerifier {
    async fn lookup(&self, username: &str) -> Result<Option<User>, StoreUnavailable> {
        self.load_user(username).await.map_err(|e| {
            error!(error = %e, "user query failed");
            StoreUnavailable::from(e)
        })
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
