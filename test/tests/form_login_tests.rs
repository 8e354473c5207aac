//! Form login, saved requests, remember-me and logout.

mod common;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use base64::prelude::*;

use common::{create_test_app, location, login_request, response_cookie, test_pool, CookieJar};

const HTML: (&str, &str) = ("Accept", "text/html");

#[actix_web::test]
async fn test_login_page_is_served() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("name=\"username\""));
    assert!(body.contains("name=\"remember-me\""));
}

#[actix_web::test]
async fn test_login_redirects_to_saved_request() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(HTML)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login"));
    jar.update(&resp);

    let req = jar.apply(login_request("alice", "alice-pw", false)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/spitters/me"));
    jar.update(&resp);

    let req = jar
        .apply(test::TestRequest::get().uri("/spitters/me").insert_header(HTML))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_ignores_off_site_saved_request() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    // `//spitters/me` is protected like `/spitters/me`, but as a Location it
    // names the host `spitters`.
    let req = test::TestRequest::get()
        .uri("//spitters/me")
        .insert_header(HTML)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login"));
    jar.update(&resp);

    let req = jar.apply(login_request("alice", "alice-pw", false)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/"));
}

#[actix_web::test]
async fn test_login_without_saved_request_goes_home() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    let resp = test::call_service(&app, login_request("bob", "bob-pw", false).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/"));
    jar.update(&resp);

    let req = jar.apply(test::TestRequest::get().uri("/")).to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "Welcome to Spittr, bob!");

    // Logged in, but bob is not a SPITTER.
    let req = jar
        .apply(test::TestRequest::get().uri("/spitters/me").insert_header(HTML))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_failed_login_redirects_to_failure_url() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    let resp =
        test::call_service(&app, login_request("alice", "wrong", false).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login?error"));
    assert!(response_cookie(&resp, "remember-me").is_none());
    jar.update(&resp);

    let req = jar.apply(test::TestRequest::get().uri("/")).to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "Welcome to Spittr!");
}

#[actix_web::test]
async fn test_disabled_user_cannot_log_in() {
    let app = create_test_app(test_pool().await).await;

    let resp =
        test::call_service(&app, login_request("carol", "carol-pw", false).to_request()).await;
    assert_eq!(location(&resp), Some("/login?error"));
}

#[actix_web::test]
async fn test_remember_me_cookie_logs_in_without_session() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    let resp = test::call_service(&app, login_request("alice", "alice-pw", true).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookie = response_cookie(&resp, "remember-me").expect("remember-me cookie");
    assert!(!cookie.value().is_empty());
    assert_eq!(
        cookie.max_age(),
        Some(actix_web::cookie::time::Duration::seconds(2_419_200))
    );
    assert_eq!(cookie.http_only(), Some(true));
    jar.update(&resp);

    // A new browser session: only the remember-me cookie survives.
    jar.remove("id");
    let req = jar
        .apply(test::TestRequest::get().uri("/spitters/me").insert_header(HTML))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The automatic login started a session.
    assert!(response_cookie(&resp, "id").is_some());
}

#[actix_web::test]
async fn test_login_without_checkbox_sets_no_remember_me_cookie() {
    let app = create_test_app(test_pool().await).await;

    let resp = test::call_service(&app, login_request("alice", "alice-pw", false).to_request()).await;
    assert!(response_cookie(&resp, "remember-me").is_none());
}

#[actix_web::test]
async fn test_tampered_remember_me_cookie_is_cleared() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(HTML)
        .cookie(Cookie::new(
            "remember-me",
            BASE64_STANDARD.encode("alice:9999999999:forged"),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login"));

    let cleared = response_cookie(&resp, "remember-me").expect("clearing cookie");
    assert!(cleared.value().is_empty());
}

#[actix_web::test]
async fn test_logout_ends_session_and_remember_me() {
    let app = create_test_app(test_pool().await).await;
    let mut jar = CookieJar::new();

    let resp = test::call_service(&app, login_request("alice", "alice-pw", true).to_request()).await;
    jar.update(&resp);
    assert!(jar.get("remember-me").is_some());

    let req = jar
        .apply(test::TestRequest::post().uri("/signout"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/"));

    let cleared = response_cookie(&resp, "remember-me").expect("clearing cookie");
    assert!(cleared.value().is_empty());
    jar.update(&resp);
    assert!(jar.get("remember-me").is_none());

    let req = jar
        .apply(test::TestRequest::get().uri("/spitters/me").insert_header(HTML))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login"));
}

#[actix_web::test]
async fn test_logout_without_login() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::post().uri("/signout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/"));
}
