mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use lume_backend::config::JwtConfig;
use lume_backend::model::user::Role;
use lume_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use lume_backend::util::refresh_store::RefreshTokenStore;

async fn register(app: &TestApp, email: &str) -> (StatusCode, serde_json::Value) {
    app.call(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "mira", "email": email, "password": "wick1234" })),
    )
    .await
}

#[tokio::test]
async fn test_register_verify_login_refresh_logout() {
    let app = TestApp::new();

    let (status, body) = register(&app, "mira@lume.test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requireOtp"], true);
    assert_eq!(body["email"], "mira@lume.test");

    let (status, body) = app
        .call("POST", "/api/auth/login", None, Some(json!({ "email": "mira@lume.test", "password": "wick1234" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please verify your email first.");

    let otp = app.email.last_otp_for("mira@lume.test").unwrap();
    assert_eq!(otp.len(), 6);
    let (status, body) = app
        .call("POST", "/api/auth/verify-otp", None, Some(json!({ "email": "mira@lume.test", "otp": otp })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully!");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["accessToken"].is_string());

    let (status, body) = app
        .call("POST", "/api/auth/verify-otp", None, Some(json!({ "email": "mira@lume.test", "otp": otp })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email already verified. Please login.");

    let (status, body) = app
        .call("POST", "/api/auth/login", None, Some(json!({ "email": "mira@lume.test", "password": "wick1234" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successfull welcome mira");
    let refresh = body["refreshToken"].as_str().unwrap().to_string();
    let access = body["accessToken"].as_str().unwrap().to_string();

    let (status, body) = app.call("GET", "/api/debug/test-auth", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token is valid");

    let (status, body) = app
        .call("POST", "/api/auth/refresh-token", None, Some(json!({ "refreshToken": refresh })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].is_string());

    let (status, body) = app
        .call("POST", "/api/auth/logout", None, Some(json!({ "refreshToken": refresh })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out succesfully");

    let (status, body) = app
        .call("POST", "/api/auth/refresh-token", None, Some(json!({ "refreshToken": refresh })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_register_rejects_missing_fields_and_short_password() {
    let app = TestApp::new();

    let (status, body) = app
        .call("POST", "/api/auth/register", None, Some(json!({ "email": "a@b.co", "password": "wick1234" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "x", "email": "not-an-email", "password": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password atleast be 6 character long");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "x", "email": "not-an-email", "password": "123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Enter a valid email");
}

#[tokio::test]
async fn test_register_existing_accounts() {
    let app = TestApp::new();
    app.customer("june").await;

    let (status, body) = register(&app, "june@lume.test").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exist please login");

    register(&app, "pending@lume.test").await;
    let first = app.email.last_otp_for("pending@lume.test").unwrap();
    let (status, body) = register(&app, "pending@lume.test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User exists but not verified. New OTP sent.");
    assert_eq!(app.email.sent.lock().unwrap().len(), 2);

    let second = app.email.last_otp_for("pending@lume.test").unwrap();
    let user = app.users.users.lock().unwrap().iter().find(|u| u.email == "pending@lume.test").cloned().unwrap();
    assert_eq!(user.otp.as_deref(), Some(second.as_str()));
    if first != second {
        let (status, _) = app
            .call("POST", "/api/auth/verify-otp", None, Some(json!({ "email": "pending@lume.test", "otp": first })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_expired_otp_is_rejected() {
    let app = TestApp::new();
    register(&app, "late@lume.test").await;
    let otp = app.email.last_otp_for("late@lume.test").unwrap();
    for user in app.users.users.lock().unwrap().iter_mut() {
        user.otp_expires_at = Some(0);
    }

    let (status, body) = app
        .call("POST", "/api/auth/verify-otp", None, Some(json!({ "email": "late@lume.test", "otp": otp })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired OTP");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new();
    app.customer("june").await;

    let (status, body) = app
        .call("POST", "/api/auth/login", None, Some(json!({ "email": "june@lume.test", "password": "nope-nope" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .call("POST", "/api/auth/login", None, Some(json!({ "email": "ghost@lume.test", "password": "whatever" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not found please sign up");
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = TestApp::new();
    app.seed_user("june", "june@lume.test", "oldpass1", Role::User).await;

    let (status, body) = app
        .call("POST", "/api/auth/forgot-password", None, Some(json!({ "email": "june@lume.test" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OTP sent to your email");
    let otp = app.email.last_otp_for("june@lume.test").unwrap();

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "email": "june@lume.test", "otp": "000000x", "newPassword": "newpass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired OTP");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "email": "june@lume.test", "otp": otp, "newPassword": "newpass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully. Please login.");

    let (status, _) = app
        .call("POST", "/api/auth/login", None, Some(json!({ "email": "june@lume.test", "password": "newpass1" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call("POST", "/api/auth/forgot-password", None, Some(json!({ "email": "ghost@lume.test" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_protected_routes_need_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/api/orders/my-orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required!");

    let (status, body) = app.call("GET", "/api/orders/my-orders", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "error while verifying the access token");
}

#[tokio::test]
async fn test_reset_otp_is_single_use() {
    let app = TestApp::new();
    app.seed_user("june", "june@lume.test", "oldpass1", Role::User).await;
    app.call("POST", "/api/auth/forgot-password", None, Some(json!({ "email": "june@lume.test" })))
        .await;
    let otp = app.email.last_otp_for("june@lume.test").unwrap();
    let reset = json!({ "email": "june@lume.test", "otp": otp, "newPassword": "newpass1" });

    let (status, _) = app.call("POST", "/api/auth/reset-password", None, Some(reset.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("POST", "/api/auth/reset-password", None, Some(reset)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired OTP");
}

#[tokio::test]
async fn test_register_accepts_loose_email_shapes() {
    let app = TestApp::new();
    for email in ["a@b.c.", "first last@x.y"] {
        let (status, body) = register(&app, email).await;
        assert_eq!(status, StatusCode::OK, "{email}");
        assert_eq!(body["requireOtp"], true);
    }
}

#[tokio::test]
async fn test_refresh_rejects_stored_tokens_that_fail_verification() {
    let app = TestApp::new();
    let (user, _) = app.customer("june").await;
    let user_id = user.id.unwrap().to_hex();

    let forged = JwtTokenUtilsImpl::new(JwtConfig {
        refresh_token_secret: "another_refresh_secret_that_is_long_enough_too".to_string(),
        ..JwtConfig::default()
    })
    .generate_refresh_token(&user_id)
    .unwrap();
    let expired = JwtTokenUtilsImpl::new(JwtConfig { refresh_token_expiration: -1, ..JwtConfig::default() })
        .generate_refresh_token(&user_id)
        .unwrap();

    for token in [forged, expired] {
        app.sessions.add(&token).await.unwrap();
        let (status, body) = app
            .call("POST", "/api/auth/refresh-token", None, Some(json!({ "refreshToken": token })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired refresh token");
    }
}

#[tokio::test]
async fn test_refresh_rejects_token_of_deleted_user() {
    let app = TestApp::new();
    let (user, _) = app.customer("june").await;
    let token = app.jwt.generate_refresh_token(&user.id.unwrap().to_hex()).unwrap();
    app.sessions.add(&token).await.unwrap();

    let (status, _) = app
        .call("POST", "/api/auth/refresh-token", None, Some(json!({ "refreshToken": token.clone() })))
        .await;
    assert_eq!(status, StatusCode::OK);

    app.users.users.lock().unwrap().clear();
    let (status, body) = app
        .call("POST", "/api/auth/refresh-token", None, Some(json!({ "refreshToken": token })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired refresh token");
}
