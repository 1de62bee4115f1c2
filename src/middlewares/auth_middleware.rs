use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::repository::user_repo::UserRepository;
use crate::util::error::HandlerError;
use crate::util::jwt::JwtTokenUtils;

/// Shared by the bearer-token and admin guards.
pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Verifies the `Authorization: Bearer` access token and stores its claims in the request extensions.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let Some(auth_header) = req.headers().get("authorization").and_then(|v| v.to_str().ok()) else {
        return Err(HandlerError::unauthorized("Access token required!"));
    };
    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Access token required!"))?;

    let claims = state.jwt_utils.validate_access_token(&token).map_err(|e| {
        warn!("Access token rejected: {e}");
        HandlerError::forbidden("error while verifying the access token")
    })?;
    debug!("Authenticated user {}", claims.sub);

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
