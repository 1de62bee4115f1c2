use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::order_handler::{
    create_order_handler, delete_order_handler, get_order_handler, list_orders_handler, my_orders_handler,
    update_order_status_handler,
};
use crate::middlewares::admin_middleware::require_admin;
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::order_service::OrderService;

pub fn order_router(service: Arc<dyn OrderService>, auth_state: Arc<AuthState>) -> Router {
    // Ownership of a single order is checked in the service.
    let user = Router::new()
        .route("/", post(create_order_handler))
        .route("/my-orders", get(my_orders_handler))
        .route("/{id}", get(get_order_handler).delete(delete_order_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/", get(list_orders_handler))
        .route("/{id}/status", put(update_order_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    user.merge(admin).with_state(service)
}
