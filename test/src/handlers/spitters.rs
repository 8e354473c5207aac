//! Spitter profile routes.

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use spittr_security_core::http::security::AuthenticatedUser;

#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub roles: Vec<String>,
}

/// Profile of the logged-in spitter. Guarded by `hasRole('SPITTER')`.
#[get("/spitters/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(Profile {
        username: user.get_username().to_string(),
        roles: user.get_roles().iter().cloned().collect(),
    })
}

/// Public page for any spitter.
#[get("/spitters/{username}")]
pub async fn show(username: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().body(format!("Spitter {}", username.into_inner()))
}
