//! HTTP Basic authentication against the Spittr configuration.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::{basic_auth, create_test_app, location, response_cookie, test_pool};

#[actix_web::test]
async fn test_missing_credentials_get_challenge() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get().uri("/spitters/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get("WWW-Authenticate").unwrap(),
        "Basic realm=\"Spittr\""
    );
}

#[actix_web::test]
async fn test_browser_is_sent_to_login_page() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Accept", "text/html,application/xhtml+xml"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), Some("/login"));
}

#[actix_web::test]
async fn test_valid_credentials() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("alice", "alice-pw")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_basic_auth_does_not_create_session() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("alice", "alice-pw")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(response_cookie(&resp, "id").is_none());
}

#[actix_web::test]
async fn test_wrong_password() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("alice", "wrong")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get("WWW-Authenticate").is_some());
}

#[actix_web::test]
async fn test_wrong_credentials_rejected_on_public_page() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spittles")
        .insert_header(("Authorization", basic_auth("mallory", "guess")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unknown_user_and_wrong_password_look_alike() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("mallory", "guess")))
        .to_request();
    let unknown = test::call_service(&app, req).await;
    let unknown_status = unknown.status();
    let unknown_body = test::read_body(unknown).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("alice", "guess")))
        .to_request();
    let wrong = test::call_service(&app, req).await;
    assert_eq!(wrong.status(), unknown_status);
    assert_eq!(test::read_body(wrong).await, unknown_body);
}

#[actix_web::test]
async fn test_disabled_user_rejected() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("carol", "carol-pw")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_malformed_header_is_ignored() {
    let app = create_test_app(test_pool().await).await;

    let req = test::TestRequest::get()
        .uri("/spittles")
        .insert_header(("Authorization", "Basic !!!not-base64!!!"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", "Bearer some-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_password_with_colon() {
    let app = create_test_app(test_pool().await).await;

    // Only the first colon separates username and password.
    let req = test::TestRequest::get()
        .uri("/spitters/me")
        .insert_header(("Authorization", basic_auth("alice", "alice-pw:extra")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
