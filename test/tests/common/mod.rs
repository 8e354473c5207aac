//! Common test utilities.
//!
//! - In-memory SQLite store with the demo schema and three users
//! - The reference Spittr security settings
//! - A small cookie jar to carry sessions between requests

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test::{self, TestRequest};
use base64::prelude::*;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use spittr::schema;
use spittr_security_core::http::security::{BCryptPasswordEncoder, SecuritySettings};

pub const REFERENCE_SETTINGS: &str = include_str!("../../spittr.toml");

/// Creates an in-memory store with:
/// - alice/alice-pw: SPITTER
/// - bob/bob-pw: no roles
/// - carol/carol-pw: SPITTER, disabled
pub async fn test_pool() -> SqlitePool {
    // One connection, or each query would see its own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    schema::create_schema(&pool).await.unwrap();

    let encoder = BCryptPasswordEncoder::with_cost(4);
    schema::add_user(&pool, &encoder, "alice", "alice-pw", &["SPITTER"])
        .await
        .unwrap();
    schema::add_user(&pool, &encoder, "bob", "bob-pw", &[]).await.unwrap();
    schema::add_user(&pool, &encoder, "carol", "carol-pw", &["SPITTER"])
        .await
        .unwrap();
    schema::set_enabled(&pool, "carol", false).await.unwrap();
    pool
}

pub fn reference_settings() -> SecuritySettings {
    spittr::AppSettings::from_toml(REFERENCE_SETTINGS)
        .unwrap()
        .security
}

/// The demo application with the reference settings over `pool`.
pub async fn create_test_app(
    pool: SqlitePool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let config = spittr::security_config(&reference_settings(), pool.clone()).unwrap();
    test::init_service(spittr::app(config, pool, Key::generate(), false)).await
}

/// Helper function to create Basic Auth header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

pub fn location<B>(res: &ServiceResponse<B>) -> Option<&str> {
    res.headers()
        .get("Location")
        .and_then(|value| value.to_str().ok())
}

pub fn response_cookie<B>(res: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

/// Keeps the cookies a browser would send back.
#[derive(Default)]
pub struct CookieJar {
    cookies: Vec<Cookie<'static>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores cookies set by `res`; an empty value removes the cookie.
    pub fn update<B>(&mut self, res: &ServiceResponse<B>) {
        for cookie in res.response().cookies() {
            self.cookies.retain(|c| c.name() != cookie.name());
            if !cookie.value().is_empty() {
                self.cookies.push(cookie.into_owned());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    pub fn remove(&mut self, name: &str) {
        self.cookies.retain(|c| c.name() != name);
    }

    pub fn apply(&self, mut req: TestRequest) -> TestRequest {
        for cookie in &self.cookies {
            req = req.cookie(cookie.clone());
        }
        req
    }
}

pub fn login_request(username: &str, password: &str, remember_me: bool) -> TestRequest {
    let mut form = vec![("username", username), ("password", password)];
    if remember_me {
        form.push(("remember-me", "on"));
    }
    TestRequest::post().uri("/login").set_form(form)
}
