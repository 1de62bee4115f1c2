use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomizationType {
    Color,
    Scent,
    Size,
    Shape,
    Base,
}

impl FromStr for CustomizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(CustomizationType::Color),
            "scent" => Ok(CustomizationType::Scent),
            "size" => Ok(CustomizationType::Size),
            "shape" => Ok(CustomizationType::Shape),
            "base" => Ok(CustomizationType::Base),
            other => Err(format!("Invalid customization type: {}", other)),
        }
    }
}

/// A selectable option in the candle builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customization {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub kind: CustomizationType,
    /// Display label
    pub name: String,
    /// Machine value matched against candle selections
    pub value: String,
    #[serde(default)]
    pub price: f64,
    pub in_stock: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
