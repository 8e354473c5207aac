//! Spittle routes. Reading is public; posting requires `hasRole('SPITTER')`.

use actix_web::error::ErrorInternalServerError;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::{error, info};

use spittr_security_core::http::security::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Spittle {
    pub id: i64,
    pub username: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SpittleForm {
    pub message: String,
}

fn database_error(e: sqlx::Error) -> actix_web::Error {
    error!(error = %e, "spittle query failed");
    ErrorInternalServerError("database error")
}

/// Most recent spittles first.
#[get("/spittles")]
pub async fn list(pool: web::Data<SqlitePool>) -> Result<HttpResponse, actix_web::Error> {
    let rows = sqlx::query("SELECT id, username, message FROM spittles ORDER BY id DESC LIMIT 20")
        .fetch_all(pool.get_ref())
        .await
        .map_err(database_error)?;

    let spittles = rows
        .iter()
        .map(|row| {
            Ok(Spittle {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                message: row.try_get("message")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(database_error)?;

    Ok(HttpResponse::Ok().json(spittles))
}

#[post("/spittles")]
pub async fn create(
    user: AuthenticatedUser,
    form: web::Form<SpittleForm>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let message = form.into_inner().message;
    if message.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("empty spittle"));
    }

    let result = sqlx::query("INSERT INTO spittles (username, message) VALUES (?, ?)")
        .bind(user.get_username())
        .bind(&message)
        .execute(pool.get_ref())
        .await
        .map_err(database_error)?;

    info!(username = %user.get_username(), "new spittle");
    Ok(HttpResponse::Created().json(Spittle {
        id: result.last_insert_rowid(),
        username: user.get_username().to_string(),
        message,
    }))
}
