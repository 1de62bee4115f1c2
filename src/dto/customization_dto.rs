use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{hex_id, present};
use crate::model::customization::{Customization, CustomizationType};
use crate::model::customized_product::CustomizedProduct;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateCustomizationRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Price must be at least 0"))]
    pub price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CustomizationDraft {
    pub kind: CustomizationType,
    pub name: String,
    pub value: String,
    pub price: f64,
}

impl CreateCustomizationRequest {
    pub fn into_draft(self) -> Result<CustomizationDraft, String> {
        let (Some(kind), Some(name), Some(value)) = (present(&self.kind), present(&self.name), present(&self.value))
        else {
            return Err("Type, name and value are required".to_string());
        };
        Ok(CustomizationDraft {
            kind: kind.parse()?,
            name: name.to_string(),
            value: value.to_string(),
            price: self.price.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomizationRequest {
    pub name: Option<String>,
    pub value: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be at least 0"))]
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
}

impl UpdateCustomizationRequest {
    pub fn apply_to(&self, customization: &mut Customization) {
        if let Some(name) = &self.name {
            customization.name = name.clone();
        }
        if let Some(value) = &self.value {
            customization.value = value.clone();
        }
        if let Some(price) = self.price {
            customization.price = price;
        }
        if let Some(in_stock) = self.in_stock {
            customization.in_stock = in_stock;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCandleRequest {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub scent: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// The four selections of a custom candle, all present.
#[derive(Debug, Clone)]
pub struct CandleSelection {
    pub color: String,
    pub scent: String,
    pub size: String,
    pub shape: String,
    pub image: Option<String>,
}

impl CandleSelection {
    pub fn values(&self) -> Vec<String> {
        vec![self.color.clone(), self.scent.clone(), self.size.clone(), self.shape.clone()]
    }
}

impl TryFrom<CreateCandleRequest> for CandleSelection {
    type Error = String;

    fn try_from(req: CreateCandleRequest) -> Result<Self, Self::Error> {
        let (Some(color), Some(scent), Some(size), Some(shape)) =
            (present(&req.color), present(&req.scent), present(&req.size), present(&req.shape))
        else {
            return Err("Color, scent, size and shape are required".to_string());
        };
        Ok(CandleSelection {
            color: color.to_string(),
            scent: scent.to_string(),
            size: size.to_string(),
            shape: shape.to_string(),
            image: req.image.filter(|i| !i.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CustomizationType,
    pub name: String,
    pub value: String,
    pub price: f64,
    pub in_stock: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Customization> for CustomizationResponse {
    fn from(c: Customization) -> Self {
        CustomizationResponse {
            id: hex_id(&c.id),
            kind: c.kind,
            name: c.name,
            value: c.value,
            price: c.price,
            in_stock: c.in_stock,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// In-stock options bucketed by type, as the candle builder consumes them.
#[derive(Debug, Default, Serialize)]
pub struct GroupedCustomizations {
    pub colors: Vec<CustomizationResponse>,
    pub scents: Vec<CustomizationResponse>,
    pub sizes: Vec<CustomizationResponse>,
    pub shapes: Vec<CustomizationResponse>,
    pub base: Vec<CustomizationResponse>,
}

impl FromIterator<Customization> for GroupedCustomizations {
    fn from_iter<I: IntoIterator<Item = Customization>>(iter: I) -> Self {
        let mut grouped = GroupedCustomizations::default();
        for c in iter {
            let bucket = match c.kind {
                CustomizationType::Color => &mut grouped.colors,
                CustomizationType::Scent => &mut grouped.scents,
                CustomizationType::Size => &mut grouped.sizes,
                CustomizationType::Shape => &mut grouped.shapes,
                CustomizationType::Base => &mut grouped.base,
            };
            bucket.push(c.into());
        }
        grouped
    }
}

#[derive(Debug, Serialize)]
pub struct CustomizationEnvelope {
    pub message: String,
    pub customization: CustomizationResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizedProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub base_price: f64,
    pub color: String,
    pub scent: String,
    pub size: String,
    pub shape: String,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<CustomizedProduct> for CustomizedProductResponse {
    fn from(p: CustomizedProduct) -> Self {
        CustomizedProductResponse {
            id: hex_id(&p.id),
            user: p.user.to_hex(),
            base_price: p.base_price,
            color: p.color,
            scent: p.scent,
            size: p.size,
            shape: p.shape,
            total_price: p.total_price,
            image: p.image,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizedProductEnvelope {
    pub message: String,
    pub customized_product: CustomizedProductResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(kind: CustomizationType, value: &str) -> Customization {
        Customization {
            id: None,
            kind,
            name: value.to_uppercase(),
            value: value.to_string(),
            price: 1.0,
            in_stock: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_grouping_by_type() {
        let grouped: GroupedCustomizations = vec![
            option(CustomizationType::Color, "red"),
            option(CustomizationType::Color, "blue"),
            option(CustomizationType::Base, "wood"),
        ]
        .into_iter()
        .collect();
        assert_eq!(grouped.colors.len(), 2);
        assert_eq!(grouped.base.len(), 1);
        assert!(grouped.scents.is_empty());
    }

    #[test]
    fn test_candle_selection_requires_all_four() {
        let req = CreateCandleRequest {
            color: Some("red".into()),
            scent: Some("vanilla".into()),
            size: Some("large".into()),
            shape: None,
            image: None,
        };
        assert!(CandleSelection::try_from(req).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let req = CreateCustomizationRequest {
            kind: Some("wick".into()),
            name: Some("Cotton".into()),
            value: Some("cotton".into()),
            price: None,
        };
        assert!(req.into_draft().is_err());
    }
}
