use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::debug_handler::{orders_test_handler, test_auth_handler};
use crate::middlewares::auth_middleware::{require_auth, AuthState};

/// Token diagnostics under `/api/debug`.
pub fn debug_router(auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/orders-test", get(orders_test_handler))
        .route("/test-auth", get(test_auth_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
}
