use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::dto::customization_dto::{
    CandleSelection, CreateCandleRequest, CreateCustomizationRequest, CustomizationEnvelope,
    CustomizedProductEnvelope, UpdateCustomizationRequest,
};
use crate::dto::MessageResponse;
use crate::handler::{caller_id, parse_object_id, validate_payload};
use crate::service::customization_service::CustomizationService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn list_customizations_handler(
    State(service): State<Arc<dyn CustomizationService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_grouped().await?))
}

pub async fn create_customization_handler(
    State(service): State<Arc<dyn CustomizationService>>,
    Json(payload): Json<CreateCustomizationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let customization = service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomizationEnvelope {
            message: "Customization option added successfully".to_string(),
            customization,
        }),
    ))
}

pub async fn update_customization_handler(
    State(service): State<Arc<dyn CustomizationService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCustomizationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let customization = service.update(id, payload).await?;
    Ok(Json(CustomizationEnvelope {
        message: "Customization option updated successfully".to_string(),
        customization,
    }))
}

pub async fn delete_customization_handler(
    State(service): State<Arc<dyn CustomizationService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(parse_object_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Customization option deleted successfully")))
}

pub async fn create_candle_handler(
    State(service): State<Arc<dyn CustomizationService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCandleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let selection = CandleSelection::try_from(payload).map_err(HandlerError::bad_request)?;
    let customized_product = service.create_candle(caller_id(&claims)?, selection).await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomizedProductEnvelope {
            message: "Custom candle created successfully".to_string(),
            customized_product,
        }),
    ))
}
