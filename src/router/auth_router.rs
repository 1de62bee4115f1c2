use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::auth_handler::{
    forgot_password_handler, login_handler, logout_handler, refresh_token_handler, register_handler,
    reset_password_handler, verify_otp_handler,
};
use crate::service::auth_service::AuthService;

/// Mounted under `/api/auth`; every route is public.
pub fn auth_router(service: Arc<dyn AuthService>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/login", post(login_handler))
        .route("/refresh-token", post(refresh_token_handler))
        .route("/logout", post(logout_handler))
        .route("/forgot-password", post(forgot_password_handler))
        .route("/reset-password", post(reset_password_handler))
        .with_state(service)
}
