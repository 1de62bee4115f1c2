use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Base price of a user-built candle before option surcharges.
pub const CUSTOM_CANDLE_BASE_PRICE: f64 = 15.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomizedProduct {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub base_price: f64,
    pub color: String,
    pub scent: String,
    pub size: String,
    pub shape: String,
    pub total_price: f64,
    pub image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
