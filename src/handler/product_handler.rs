use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dto::product_dto::{
    CreateProductRequest, ProductEnvelope, ProductListResponse, UpdateProductRequest,
};
use crate::dto::MessageResponse;
use crate::handler::{caller_id, parse_object_id, validate_payload};
use crate::service::product_service::ProductService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::util::upload::{UploadedImage, MAX_IMAGES_PER_REQUEST};

/// A product body plus any image files that came with it.
pub struct ProductForm<T> {
    pub payload: T,
    pub uploads: Vec<UploadedImage>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// Form fields arrive as text; coerce the typed ones so the JSON request types can be reused.
fn form_value(name: &str, raw: String) -> Result<Value, HandlerError> {
    let invalid = || HandlerError::bad_request(format!("Invalid {}: {}", name, raw));
    Ok(match name {
        "price" => Value::from(raw.trim().parse::<f64>().map_err(|_| invalid())?),
        "stockQuantity" => Value::from(raw.trim().parse::<i64>().map_err(|_| invalid())?),
        "inStock" => Value::from(raw.trim().parse::<bool>().map_err(|_| invalid())?),
        _ => Value::String(raw),
    })
}

async fn read_multipart<T: DeserializeOwned>(mut multipart: Multipart) -> Result<ProductForm<T>, HandlerError> {
    let mut fields = Map::new();
    let mut image_refs = Vec::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next field: {}", e);
        HandlerError::bad_request(format!("Failed to get next field: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("Processing field: {}", name);

        if name == "images" && field.file_name().is_some() {
            if uploads.len() == MAX_IMAGES_PER_REQUEST {
                return Err(HandlerError::bad_request(format!(
                    "Too many files: at most {} images per request",
                    MAX_IMAGES_PER_REQUEST
                )));
            }
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| HandlerError::bad_request(format!("Failed to read file: {}", e)))?;
            info!("Received image {:?} ({} bytes)", file_name, bytes.len());
            uploads.push(UploadedImage { file_name, content_type, bytes: bytes.to_vec() });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| HandlerError::bad_request(format!("Failed to read field {}: {}", name, e)))?;
        if name == "images" {
            image_refs.push(Value::String(text));
        } else {
            fields.insert(name.clone(), form_value(&name, text)?);
        }
    }

    if !image_refs.is_empty() {
        fields.insert("images".to_string(), Value::Array(image_refs));
    }
    let payload = serde_json::from_value(Value::Object(fields))
        .map_err(|e| HandlerError::bad_request(format!("Invalid product form: {}", e)))?;
    Ok(ProductForm { payload, uploads })
}

/// Accepts `multipart/form-data` with image files, or a JSON body.
pub async fn read_product_request<T: DeserializeOwned>(req: Request) -> Result<ProductForm<T>, HandlerError> {
    if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        read_multipart(multipart).await
    } else {
        let Json(payload) = Json::<T>::from_request(req, &())
            .await
            .map_err(|e| HandlerError::bad_request(e.body_text()))?;
        Ok(ProductForm { payload, uploads: Vec::new() })
    }
}

pub async fn create_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Extension(claims): Extension<Claims>,
    req: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let form = read_product_request::<CreateProductRequest>(req).await?;
    validate_payload(&form.payload)?;
    let created_by = caller_id(&claims)?;

    let product = service.create(form.payload, form.uploads, created_by).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductEnvelope { message: Some("Product created successfully".to_string()), product }),
    ))
}

pub async fn list_products_handler(
    State(service): State<Arc<dyn ProductService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let products = service.list().await?;
    Ok(Json(ProductListResponse { count: products.len(), products }))
}

pub async fn get_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.get(parse_object_id(&id)?).await?;
    Ok(Json(ProductEnvelope { message: None, product }))
}

pub async fn update_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
    req: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let form = read_product_request::<UpdateProductRequest>(req).await?;
    validate_payload(&form.payload)?;

    let product = service.update(id, form.payload, form.uploads).await?;
    Ok(Json(ProductEnvelope { message: Some("Product updated successfully".to_string()), product }))
}

pub async fn delete_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(parse_object_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
