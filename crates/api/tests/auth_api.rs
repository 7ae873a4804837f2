//! HTTP-level integration tests for the auth endpoints.
//!
//! Tests cover signup, login, token refresh with rotation, logout, and
//! Bearer-token enforcement on protected routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth};
use sqlx::PgPool;

/// Log in a user via the API and return the JSON response.
async fn login_user(app: axum::Router, email: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// Signup returns 201 with tokens and public user info, no password hash.
#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_success(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Ada",
        "email": "ada@example.com",
        "password": "hunter2hunter2",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["accessToken"].is_string());
    assert!(json["refreshToken"].is_string());
    assert!(json["expiresIn"].is_number());
    assert_eq!(json["user"]["name"], "Ada");
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert!(
        json["user"].get("passwordHash").is_none() && json["user"].get("password_hash").is_none(),
        "password hash must never appear in a response"
    );
}

/// Signing up twice with the same email returns 409.
#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_duplicate_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::signup_user(app.clone(), "First", "dup@example.com").await;

    let body = serde_json::json!({
        "name": "Second",
        "email": "dup@example.com",
        "password": "another_password",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Email is already registered");
}

/// A too-short password is refused with a 400 and a human-readable message.
#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_weak_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Weak",
        "email": "weak@example.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(
        json["message"].as_str().unwrap().contains("at least 8"),
        "message should state the minimum length"
    );
}

/// A malformed email is refused with a 400.
#[sqlx::test(migrations = "../../migrations")]
async fn test_signup_invalid_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Bad",
        "email": "not-an-email",
        "password": "long_enough_password",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns tokens and user info.
#[sqlx::test(migrations = "../../migrations")]
async fn test_login_success(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, user_id) = common::signup_user(app.clone(), "Login", "login@example.com").await;

    let json = login_user(app, "login@example.com", "test_password_123!").await;
    assert!(json["accessToken"].is_string());
    assert!(json["refreshToken"].is_string());
    assert_eq!(json["user"]["id"], user_id);
    assert_eq!(json["user"]["email"], "login@example.com");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../../migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::signup_user(app.clone(), "WrongPw", "wrongpw@example.com").await;

    let body = serde_json::json!({ "email": "wrongpw@example.com", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid email or password");
}

/// Login with a nonexistent email returns 401 with the same message as a
/// wrong password, so the endpoint does not leak which emails exist.
#[sqlx::test(migrations = "../../migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "ghost@example.com", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid email or password");
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new tokens, and rotation makes the old
/// refresh token single-use.
#[sqlx::test(migrations = "../../migrations")]
async fn test_token_refresh_rotation(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::signup_user(app.clone(), "Refresher", "refresh@example.com").await;

    let login_json = login_user(app.clone(), "refresh@example.com", "test_password_123!").await;
    let refresh_token = login_json["refreshToken"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refreshToken": refresh_token });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["accessToken"].is_string());
    assert_ne!(
        json["refreshToken"].as_str().unwrap(),
        refresh_token,
        "rotation must issue a different refresh token"
    );

    // The original token was revoked by the rotation.
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// An unknown refresh token returns 401.
#[sqlx::test(migrations = "../../migrations")]
async fn test_refresh_with_garbage_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "refreshToken": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes the user's sessions, so refresh fails afterwards.
#[sqlx::test(migrations = "../../migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::signup_user(app.clone(), "Leaver", "leaver@example.com").await;

    let login_json = login_user(app.clone(), "leaver@example.com", "test_password_123!").await;
    let refresh_token = login_json["refreshToken"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/auth/logout",
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refreshToken": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Bearer enforcement
// ---------------------------------------------------------------------------

/// Protected routes reject missing, malformed, and invalid tokens.
#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_route_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app.clone(), "/api/v1/events").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app.clone(), "/api/v1/events", "garbage-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The health endpoint is public and reports a healthy database.
#[sqlx::test(migrations = "../../migrations")]
async fn test_health_endpoint_is_public(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

/// CORS preflight advertises only the verbs the API serves and echoes the
/// configured origin.
#[sqlx::test(migrations = "../../migrations")]
async fn test_cors_preflight_exposes_only_served_methods(pool: PgPool) {
    use tower::ServiceExt;

    let app = common::build_test_app(pool);
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/events")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "PUT")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let allowed = response
        .headers()
        .get("access-control-allow-methods")
        .expect("preflight must list allowed methods")
        .to_str()
        .unwrap();
    for method in ["GET", "POST", "PUT"] {
        assert!(allowed.contains(method), "missing {method} in {allowed}");
    }
    assert!(
        !allowed.contains("DELETE") && !allowed.contains("PATCH"),
        "unserved methods must not be advertised: {allowed}"
    );
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
