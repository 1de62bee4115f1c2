use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Scented,
    Unscented,
    Decorative,
    Aromatherapy,
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scented" => Ok(ProductCategory::Scented),
            "unscented" => Ok(ProductCategory::Unscented),
            "decorative" => Ok(ProductCategory::Decorative),
            "aromatherapy" => Ok(ProductCategory::Aromatherapy),
            other => Err(format!("Invalid category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CandleSize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl FromStr for CandleSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(CandleSize::Small),
            "medium" => Ok(CandleSize::Medium),
            "large" => Ok(CandleSize::Large),
            "x-large" => Ok(CandleSize::XLarge),
            other => Err(format!("Invalid size: {}", other)),
        }
    }
}

pub const DEFAULT_SCENT: &str = "unscented";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub scent: String,
    #[serde(default)]
    pub size: CandleSize,
    pub burn_time: String,
    pub in_stock: bool,
    pub stock_quantity: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_by: ObjectId,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_wire_names() {
        assert_eq!(serde_json::to_string(&CandleSize::XLarge).unwrap(), "\"x-large\"");
        assert_eq!("x-large".parse::<CandleSize>().unwrap(), CandleSize::XLarge);
        assert_eq!(CandleSize::default(), CandleSize::Medium);
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!("smoky".parse::<ProductCategory>().is_err());
        assert_eq!("aromatherapy".parse::<ProductCategory>().unwrap(), ProductCategory::Aromatherapy);
    }
}
