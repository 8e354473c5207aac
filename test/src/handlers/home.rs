//! Home and login pages.

use actix_web::{get, HttpRequest, HttpResponse, Responder};

use spittr_security_core::http::security::OptionalUser;

/// Home page. Open to everyone, greets the user when logged in.
#[get("/")]
pub async fn index(user: OptionalUser) -> impl Responder {
    match user.into_inner() {
        Some(principal) => {
            HttpResponse::Ok().body(format!("Welcome to Spittr, {}!", principal.get_username()))
        }
        None => HttpResponse::Ok().body("Welcome to Spittr!"),
    }
}

/// Login form. Submissions go to `POST /login`, which the security layer handles.
#[get("/login")]
pub async fn login_page(req: HttpRequest) -> impl Responder {
    let query = req.query_string();
    let notice = if query.split('&').any(|p| p == "error") {
        "<p class=\"error\">Invalid username or password.</p>"
    } else if query.split('&').any(|p| p == "logout") {
        "<p>You have been logged out.</p>"
    } else {
        ""
    };

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            r#"<html>
<head><title>Spittr</title></head>
<body>
<h1>Login</h1>
{notice}
<form method="POST" action="/login">
  <label>Username <input type="text" name="username"/></label>
  <label>Password <input type="password" name="password"/></label>
  <label><input type="checkbox" name="remember-me"/> Remember me</label>
  <button type="submit">Login</button>
</form>
</body>
</html>"#
        ))
}
