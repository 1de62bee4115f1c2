use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::product_handler::{
    create_product_handler, delete_product_handler, get_product_handler, list_products_handler,
    update_product_handler,
};
use crate::middlewares::admin_middleware::require_admin;
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::product_service::ProductService;

pub fn product_router(service: Arc<dyn ProductService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/", get(list_products_handler))
        .route("/{id}", get(get_product_handler));

    let admin = Router::new()
        .route("/", post(create_product_handler))
        .route("/{id}", axum::routing::put(update_product_handler).delete(delete_product_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(admin).with_state(service)
}
