use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, warn};

use crate::middlewares::auth_middleware::AuthState;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

/// Must run after `require_auth`. The role is read from the stored user, not from the token.
pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let Some(claims) = req.extensions().get::<Claims>() else {
        return Err(HandlerError::unauthorized("User not authenticated"));
    };
    let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::unauthorized("User not authenticated"))?;

    let user = match state.user_repo.find_by_id(&user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(HandlerError::not_found("User not found")),
        Err(e) => {
            error!("Admin check failed: {e}");
            return Err(HandlerError::internal("Server error").with_details(e.to_string()));
        }
    };

    if !user.is_admin() {
        warn!("Admin access denied: {} is {}", user.email, user.role.as_str());
        return Err(HandlerError::forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}
