//! # Spittr
//!
//! Demo application for `spittr-security-core`: form login with remember-me,
//! HTTP Basic for API clients, and users read from SQLite.

pub mod handlers;
pub mod settings;

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::body::MessageBody;
use actix_web::cookie::Key;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{web, App};
use sqlx::SqlitePool;

use spittr_security_core::http::error::ConfigError;
use spittr_security_core::http::security::{
    form_login, BCryptPasswordEncoder, HttpSecurity, JdbcVerifier, SecurityConfig,
    SecurityTransform, SecuritySettings,
};

pub use settings::AppSettings;

/// Builds the security configuration: a `JdbcVerifier` over `pool` with
/// BCrypt hashes, plus everything declared in `settings`.
pub fn security_config(
    settings: &SecuritySettings,
    pool: SqlitePool,
) -> Result<Arc<SecurityConfig>, ConfigError> {
    HttpSecurity::new()
        .verifier(JdbcVerifier::new(pool, BCryptPasswordEncoder::new()))
        .settings(settings)?
        .build()
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::home::index)
        .service(handlers::home::login_page)
        .service(handlers::spitters::me)
        .service(handlers::spitters::show)
        .service(handlers::spittles::list)
        .service(handlers::spittles::create);
}

/// The complete application.
///
/// The session middleware is registered last so that it runs before the
/// security middleware.
pub fn app(
    config: Arc<SecurityConfig>,
    pool: SqlitePool,
    session_key: Key,
    secure_cookies: bool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(pool))
        .configure(form_login::configure(config.clone()))
        .configure(routes)
        .wrap(SecurityTransform::new(config))
        .wrap(
            SessionMiddleware::builder(CookieSessionStore::default(), session_key)
                .cookie_secure(secure_cookies)
                .build(),
        )
        .wrap(Logger::default())
}
