//! # Spittr Security Core
//!
//! Request authentication and URL-based authorization for Actix Web,
//! modelled on Spring Security's `HttpSecurity` configuration.
//!
//! - [`http::security`] - Credential verification, authorization rules and middleware
//! - [`http::error`] - Error types

pub mod http;
