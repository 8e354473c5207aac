//! Security module providing authentication and authorization.
//!
//! # Spring Equivalent
//! `org.springframework.security` package
//!
//! # Module Structure
//!
//! - `verifier` - `CredentialVerifier` trait, `Principal`, `AuthenticationResult`
//! - `authenticator` - In-memory verifier
//! - `jdbc` - SQL-backed verifier
//! - `ldap` - Directory-service verifier adapter
//! - `crypto` - Password encoding (Argon2, BCrypt, NoOp, Delegating)
//! - `authorizer` - Ordered URL rules and the `AuthorizationEngine`
//! - `ant_matcher` - Ant-style URL pattern matching
//! - `config` - `HttpSecurity` builder and the frozen `SecurityConfig`
//! - `settings` - TOML-loadable `SecuritySettings`
//! - `form_login` - Login/logout form processing
//! - `http_basic` - HTTP Basic authentication
//! - `remember_me` - Remember-me cookies
//! - `session` - Session-held principal and saved requests
//! - `csrf` - CSRF token verification
//! - `middleware` - Security middleware (`SecurityTransform`)
//! - `extractor` - Actix Web extractors (`AuthenticatedUser`, `OptionalUser`)
//! - `user` - User model
//!
//! # Feature Flags
//! - `argon2`: Enables `Argon2PasswordEncoder` and `DelegatingPasswordEncoder`
//! - `bcrypt`: Enables `BCryptPasswordEncoder`
//! - `jdbc`: Enables `JdbcVerifier` (sqlx, SQLite)

pub use ant_matcher::{AntMatcher, AntMatchers};
pub use authenticator::InMemoryVerifier;
pub use authorizer::{AuthorizationEngine, Decision, RequestPattern, Requirement, Rule};
pub use config::{HttpSecurity, SecurityConfig};
#[cfg(feature = "bcrypt")]
pub use crypto::BCryptPasswordEncoder;
pub use crypto::{constant_time_eq, NoOpPasswordEncoder, PasswordEncoder};
#[cfg(feature = "argon2")]
pub use crypto::{Argon2PasswordEncoder, DelegatingPasswordEncoder};
pub use csrf::{requires_csrf, CsrfConfig, CsrfVerifier, SessionCsrfVerifier};
pub use extractor::{AuthenticatedUser, OptionalUser};
pub use form_login::{FormLoginConfig, LoginForm};
pub use http_basic::{parse_basic_credentials, BasicCredentials, HttpBasicConfig};
#[cfg(feature = "jdbc")]
pub use jdbc::JdbcVerifier;
pub use ldap::{DirectoryClient, DirectoryConfig, DirectoryEntry, DirectoryVerifier, MockDirectoryClient};
pub use middleware::SecurityTransform;
pub use remember_me::{RememberMeConfig, RememberMeServices, RememberMeToken};
pub use session::{is_local_url, SessionConfig, SessionError, SessionFixationStrategy};
pub use settings::SecuritySettings;
pub use user::User;
pub use verifier::{check_password, AuthenticationResult, CredentialVerifier, Principal};

mod extractor;
mod user;

pub mod ant_matcher;
pub mod authenticator;
pub mod authorizer;
pub mod config;
pub mod crypto;
pub mod csrf;
pub mod form_login;
pub mod http_basic;
#[cfg(feature = "jdbc")]
pub mod jdbc;
pub mod ldap;
pub mod middleware;
pub mod remember_me;
pub mod session;
pub mod settings;
pub mod verifier;
