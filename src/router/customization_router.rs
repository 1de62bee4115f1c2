use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::customization_handler::{
    create_candle_handler, create_customization_handler, delete_customization_handler,
    list_customizations_handler, update_customization_handler,
};
use crate::middlewares::admin_middleware::require_admin;
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::customization_service::CustomizationService;

pub fn customization_router(service: Arc<dyn CustomizationService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new().route("/", get(list_customizations_handler));

    let user = Router::new()
        .route("/create-candle", post(create_candle_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/", post(create_customization_handler))
        .route("/{id}", put(update_customization_handler).delete(delete_customization_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(user).merge(admin).with_state(service)
}
