use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{hex_id, present};
use crate::model::product::{CandleSize, Product, ProductCategory, DEFAULT_SCENT};
use crate::model::user::User;

/// `images` may arrive as one string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageRefs {
    One(String),
    Many(Vec<String>),
}

impl Default for ImageRefs {
    fn default() -> Self {
        ImageRefs::Many(Vec::new())
    }
}

impl From<ImageRefs> for Vec<String> {
    fn from(refs: ImageRefs) -> Self {
        match refs {
            ImageRefs::One(s) => vec![s],
            ImageRefs::Many(v) => v,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Price must be at least 0"))]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub scent: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub burn_time: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock quantity must be at least 0"))]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub images: ImageRefs,
}

/// Validated product fields, before images are resolved and the creator is attached.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub scent: String,
    pub size: CandleSize,
    pub burn_time: String,
    pub in_stock: bool,
    pub stock_quantity: i64,
}

impl CreateProductRequest {
    /// Splits the request into validated fields and raw image references.
    pub fn into_draft(self) -> Result<(ProductDraft, Vec<String>), String> {
        let (Some(name), Some(description), Some(price), Some(category), Some(burn_time)) = (
            present(&self.name),
            present(&self.description),
            self.price,
            present(&self.category),
            present(&self.burn_time),
        ) else {
            return Err("Name, description, price, category and burnTime are required".to_string());
        };

        let draft = ProductDraft {
            name: name.to_string(),
            description: description.to_string(),
            price,
            category: category.parse()?,
            scent: present(&self.scent).unwrap_or(DEFAULT_SCENT).to_string(),
            size: match present(&self.size) {
                Some(size) => size.parse()?,
                None => CandleSize::default(),
            },
            burn_time: burn_time.to_string(),
            in_stock: self.in_stock.unwrap_or(true),
            stock_quantity: self.stock_quantity.unwrap_or(0),
        };
        Ok((draft, self.images.into()))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be at least 0"))]
    pub price: Option<f64>,
    pub category: Option<String>,
    pub scent: Option<String>,
    pub size: Option<String>,
    pub burn_time: Option<String>,
    pub in_stock: Option<bool>,
    #[validate(range(min = 0, message = "Stock quantity must be at least 0"))]
    pub stock_quantity: Option<i64>,
    pub images: Option<ImageRefs>,
}

impl UpdateProductRequest {
    /// Overwrites the fields that were sent; images are handled by the caller.
    pub fn apply_to(&self, product: &mut Product) -> Result<(), String> {
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err("Name cannot be empty".to_string());
            }
            product.name = name.to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = &self.category {
            product.category = category.parse()?;
        }
        if let Some(scent) = &self.scent {
            product.scent = scent.clone();
        }
        if let Some(size) = &self.size {
            product.size = size.parse()?;
        }
        if let Some(burn_time) = &self.burn_time {
            product.burn_time = burn_time.clone();
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if let Some(stock_quantity) = self.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub scent: String,
    pub size: CandleSize,
    pub burn_time: String,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub images: Vec<String>,
    pub created_by: ProductCreator,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Who created a product: a bare id, or `{_id, username}` when the user was looked up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProductCreator {
    Id(String),
    Summary {
        #[serde(rename = "_id")]
        id: String,
        username: String,
    },
}

impl ProductCreator {
    pub fn summary(user: &User) -> Self {
        ProductCreator::Summary { id: hex_id(&user.id), username: user.username.clone() }
    }
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: hex_id(&p.id),
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            scent: p.scent,
            size: p.size,
            burn_time: p.burn_time,
            in_stock: p.in_stock,
            stock_quantity: p.stock_quantity,
            images: p.images,
            created_by: ProductCreator::Id(p.created_by.to_hex()),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub count: usize,
    pub products: Vec<ProductResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProductEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub product: ProductResponse,
}
