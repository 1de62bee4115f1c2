use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::dto::order_dto::{CreateOrderRequest, OrderEnvelope, UpdateOrderStatusRequest};
use crate::dto::MessageResponse;
use crate::handler::{caller_id, parse_object_id};
use crate::service::order_service::OrderService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn create_order_handler(
    State(service): State<Arc<dyn OrderService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let new_order = payload.into_new_order().map_err(HandlerError::bad_request)?;
    let order = service.create(caller_id(&claims)?, new_order).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderEnvelope { message: "Order created successfully".to_string(), order }),
    ))
}

pub async fn my_orders_handler(
    State(service): State<Arc<dyn OrderService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.my_orders(caller_id(&claims)?).await?))
}

pub async fn list_orders_handler(
    State(service): State<Arc<dyn OrderService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.all_orders().await?))
}

pub async fn get_order_handler(
    State(service): State<Arc<dyn OrderService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get(parse_object_id(&id)?, &claims).await?))
}

pub async fn update_order_status_handler(
    State(service): State<Arc<dyn OrderService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let status = payload.parse_status().map_err(HandlerError::bad_request)?;
    let order = service.update_status(id, status).await?;
    Ok(Json(OrderEnvelope { message: "Order status updated successfully".to_string(), order }))
}

pub async fn delete_order_handler(
    State(service): State<Arc<dyn OrderService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(parse_object_id(&id)?, &claims).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
