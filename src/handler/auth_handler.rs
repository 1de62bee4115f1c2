use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::dto::auth_dto::{
    EmailRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
    VerifyOutcome,
};
use crate::dto::{first_validation_message, present, MessageResponse};
use crate::service::auth_service::AuthService;
use crate::util::error::{HandlerError, HandlerErrorKind};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// The password rule is reported before the email shape.
fn signup_error(errors: &ValidationErrors) -> HandlerError {
    let message = errors
        .field_errors()
        .get("password")
        .and_then(|errs| errs.first())
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| first_validation_message(errors));
    HandlerError::new(HandlerErrorKind::Validation, message)
}

pub async fn register_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let (Some(username), Some(email), Some(password)) =
        (present(&payload.username), present(&payload.email), payload.password.as_deref().filter(|p| !p.is_empty()))
    else {
        return Err(HandlerError::bad_request(ALL_FIELDS_REQUIRED));
    };
    payload.validate().map_err(|e| signup_error(&e))?;

    let res = service
        .register(username.to_string(), email.to_string(), password.to_string())
        .await?;
    Ok(Json(res))
}

pub async fn verify_otp_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<axum::response::Response, HandlerError> {
    let (Some(email), Some(otp)) = (present(&payload.email), present(&payload.otp)) else {
        return Err(HandlerError::bad_request(ALL_FIELDS_REQUIRED));
    };
    let outcome = service.verify_otp(email.to_string(), otp.to_string()).await?;
    Ok(match outcome {
        VerifyOutcome::AlreadyVerified => Json(MessageResponse::new("Email already verified. Please login.")).into_response(),
        VerifyOutcome::Verified(session) => Json(session).into_response(),
    })
}

pub async fn login_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let (Some(email), Some(password)) = (present(&payload.email), payload.password.as_deref().filter(|p| !p.is_empty()))
    else {
        return Err(HandlerError::bad_request(ALL_FIELDS_REQUIRED));
    };
    let res = service.login(email.to_string(), password.to_string()).await?;
    Ok(Json(res))
}

pub async fn refresh_token_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let Some(token) = present(&payload.refresh_token) else {
        return Err(HandlerError::unauthorized("Refreshed token required"));
    };
    let res = service.refresh(token.to_string()).await?;
    Ok(Json(res))
}

pub async fn logout_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    service.logout(payload.refresh_token).await?;
    info!("Session closed");
    Ok(Json(MessageResponse::new("Logged out succesfully")))
}

pub async fn forgot_password_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let Some(email) = present(&payload.email) else {
        return Err(HandlerError::bad_request("Email is required"));
    };
    service.forgot_password(email.to_string()).await?;
    Ok(Json(MessageResponse::new("OTP sent to your email")))
}

pub async fn reset_password_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let (Some(email), Some(otp), Some(new_password)) = (
        present(&payload.email),
        present(&payload.otp),
        payload.new_password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(HandlerError::bad_request(ALL_FIELDS_REQUIRED));
    };
    payload.validate().map_err(|e| signup_error(&e))?;

    service
        .reset_password(email.to_string(), otp.to_string(), new_password.to_string())
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully. Please login.")))
}
