use axum::{response::IntoResponse, Extension, Json};
use serde::Serialize;

use crate::util::jwt::Claims;

#[derive(Debug, Serialize)]
pub struct TokenEcho {
    pub message: &'static str,
    pub user: Claims,
}

pub async fn orders_test_handler(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(TokenEcho { message: "Orders API is working", user: claims })
}

pub async fn test_auth_handler(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(TokenEcho { message: "Token is valid", user: claims })
}
