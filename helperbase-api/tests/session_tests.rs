//! Session lifecycle through the real router: login, cookie auth, logout.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use helperbase_api::ApiConfig;
use helperbase_core::Role;
use serde_json::json;

#[path = "support/app.rs"]
mod app_support;
use app_support::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn login_returns_token_profile_and_cookie() -> Result<(), String> {
    let app = TestApp::new()?;
    app.user("staff@example.org", Role::Staff).await?;

    let response = app
        .request(
            Method::POST,
            "/api/v1/session/login",
            None,
            Some(json!({ "email": " STAFF@example.org ", "password": TEST_PASSWORD })),
        )
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(response.body["user"]["role"], "staff");
    assert!(response.body["user"].get("password_hash").is_none());
    assert_eq!(response.body["permissions"]["can_delete"], true);
    assert_eq!(response.body["permissions"]["can_manage_users"], false);

    let cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or("missing Set-Cookie")?;
    assert!(cookie.starts_with("helperbase_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_message() -> Result<(), String> {
    let app = TestApp::new()?;
    app.user("viewer@example.org", Role::Viewer).await?;

    let wrong_password = app
        .request(
            Method::POST,
            "/api/v1/session/login",
            None,
            Some(json!({ "email": "viewer@example.org", "password": "not-the-password" })),
        )
        .await?;
    let unknown_email = app
        .request(
            Method::POST,
            "/api/v1/session/login",
            None,
            Some(json!({ "email": "nobody@example.org", "password": TEST_PASSWORD })),
        )
        .await?;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
    Ok(())
}

#[tokio::test]
async fn login_records_last_login() -> Result<(), String> {
    let app = TestApp::new()?;
    app.user("admin@example.org", Role::Admin).await?;

    let login = app
        .request(
            Method::POST,
            "/api/v1/session/login",
            None,
            Some(json!({ "email": "admin@example.org", "password": TEST_PASSWORD })),
        )
        .await?;
    assert_eq!(login.status, StatusCode::OK);
    assert!(!login.body["user"]["last_login_at"].is_null());
    Ok(())
}

#[tokio::test]
async fn session_cookie_authenticates_me() -> Result<(), String> {
    let app = TestApp::new()?;
    let (user, token) = app.user("viewer@example.org", Role::Viewer).await?;

    let request = Request::builder()
        .uri("/api/v1/session/me")
        .header(header::COOKIE, format!("helperbase_session={}", token))
        .body(Body::empty())
        .map_err(|e| e.to_string())?;
    let response = app.send(request).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["user_id"], user.user_id.to_string());
    assert_eq!(response.body["permissions"]["can_view"], true);
    assert_eq!(response.body["permissions"]["can_create"], false);
    Ok(())
}

#[tokio::test]
async fn missing_or_bad_session_is_unauthorized() -> Result<(), String> {
    let app = TestApp::new()?;

    let anonymous = app
        .request(Method::GET, "/api/v1/helpers", None, None)
        .await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forged = app.get("/api/v1/helpers", "not.a.token").await?;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<(), String> {
    let app = TestApp::new()?;
    let token = app.token_for(Role::Viewer).await?;

    let response = app
        .request(Method::POST, "/api/v1/session/logout", Some(&token), None)
        .await?;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or("missing Set-Cookie")?;
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn login_is_rate_limited_per_ip() -> Result<(), String> {
    let app = TestApp::with_config(ApiConfig {
        rate_limit_unauthenticated: 1,
        rate_limit_burst: 2,
        ..ApiConfig::default()
    })?;

    let attempt = || async {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/session/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.50")
            .body(Body::from(
                json!({ "email": "x@example.org", "password": "whatever1" }).to_string(),
            ))
            .map_err(|e| e.to_string())?;
        app.send(request).await
    };

    assert_eq!(attempt().await?.status, StatusCode::UNAUTHORIZED);
    assert_eq!(attempt().await?.status, StatusCode::UNAUTHORIZED);
    let limited = attempt().await?;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers.contains_key("retry-after"));
    Ok(())
}
