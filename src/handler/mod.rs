pub mod auth_handler;
pub mod customization_handler;
pub mod debug_handler;
pub mod order_handler;
pub mod product_handler;

use bson::oid::ObjectId;
use validator::Validate;

use crate::dto::first_validation_message;
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::Claims;

/// Path ids must be 24-char hex ObjectIds.
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(id).map_err(|_| HandlerError::bad_request(format!("Invalid id: {}", id)))
}

pub(crate) fn caller_id(claims: &Claims) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::unauthorized("Invalid token subject"))
}

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::new(HandlerErrorKind::Validation, first_validation_message(&e)))
}
