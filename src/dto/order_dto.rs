use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::{hex_id, present};
use crate::model::order::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::model::user::User;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Option<Vec<OrderItemRequest>>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddressRequest>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Product id for catalog items
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub scent: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub color_name: Option<String>,
    #[serde(default)]
    pub scent_name: Option<String>,
    #[serde(default)]
    pub size_name: Option<String>,
    #[serde(default)]
    pub shape_name: Option<String>,
}

impl OrderItemRequest {
    /// Custom candles keep their selections; catalog items keep only the product reference.
    pub fn into_item(self) -> Result<OrderItem, String> {
        let name = present(&self.name).ok_or("Each item needs a name")?.to_string();
        let price = self.price.ok_or("Each item needs a price")?;
        if price < 0.0 {
            return Err("Item price must be at least 0".to_string());
        }
        if self.quantity == 0 {
            return Err("Item quantity must be at least 1".to_string());
        }

        let mut item = OrderItem {
            id: None,
            product: None,
            name,
            price,
            quantity: self.quantity,
            is_custom: self.is_custom,
            color: None,
            scent: None,
            size: None,
            shape: None,
            color_name: None,
            scent_name: None,
            size_name: None,
            shape_name: None,
            created_at: None,
            updated_at: None,
        };

        if self.is_custom {
            item.color = self.color;
            item.scent = self.scent;
            item.size = self.size;
            item.shape = self.shape;
            item.color_name = self.color_name;
            item.scent_name = self.scent_name;
            item.size_name = self.size_name;
            item.shape_name = self.shape_name;
        } else if let Some(id) = present(&self.id) {
            let product = ObjectId::parse_str(id).map_err(|_| format!("Invalid product id: {}", id))?;
            item.product = Some(product);
        }
        Ok(item)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl TryFrom<ShippingAddressRequest> for ShippingAddress {
    type Error = String;

    fn try_from(req: ShippingAddressRequest) -> Result<Self, Self::Error> {
        let field = |value: &Option<String>, label: &str| {
            present(value)
                .map(str::to_string)
                .ok_or_else(|| format!("Shipping address {} is required", label))
        };
        Ok(ShippingAddress {
            name: field(&req.name, "name")?,
            phone: field(&req.phone, "phone")?,
            address: field(&req.address, "address")?,
            city: field(&req.city, "city")?,
            state: field(&req.state, "state")?,
            zip_code: field(&req.zip_code, "zipCode")?,
            country: field(&req.country, "country")?,
        })
    }
}

/// Everything needed to place an order once the request has been checked.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl CreateOrderRequest {
    pub fn into_new_order(self) -> Result<NewOrder, String> {
        let items = match self.items {
            Some(items) if !items.is_empty() => items,
            _ => return Err("Order must contain at least one item".to_string()),
        };
        let (Some(address), Some(method)) = (self.shipping_address, present(&self.payment_method)) else {
            return Err("Shipping address and payment method are required".to_string());
        };

        Ok(NewOrder {
            items: items.into_iter().map(OrderItemRequest::into_item).collect::<Result<_, _>>()?,
            shipping_address: address.try_into()?,
            payment_method: method.parse()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateOrderStatusRequest {
    pub fn parse_status(&self) -> Result<OrderStatus, String> {
        present(&self.status)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "Invalid status".to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub is_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            id: hex_id(&item.id),
            product: item.product.map(|p| p.to_hex()),
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            is_custom: item.is_custom,
            color: item.color,
            scent: item.scent,
            size: item.size,
            shape: item.shape,
            color_name: item.color_name,
            scent_name: item.scent_name,
            size_name: item.size_name,
            shape_name: item.shape_name,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// The order owner: a bare id, or a summary when the user was looked up.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OrderUser {
    Id(String),
    Summary {
        #[serde(rename = "_id")]
        id: String,
        username: String,
        email: String,
    },
}

impl OrderUser {
    pub fn summary(user: &User) -> Self {
        OrderUser::Summary {
            id: hex_id(&user.id),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressResponse {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<ShippingAddress> for ShippingAddressResponse {
    fn from(a: ShippingAddress) -> Self {
        ShippingAddressResponse {
            name: a.name,
            phone: a.phone,
            address: a.address,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_number: String,
    pub user: OrderUser,
    pub items: Vec<OrderItemResponse>,
    pub total: f64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddressResponse,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl OrderResponse {
    /// Builds the populated view of an order from its loaded items and owner.
    pub fn populated(order: Order, items: Vec<OrderItem>, user: OrderUser) -> Self {
        OrderResponse {
            id: hex_id(&order.id),
            order_number: order.order_number,
            user,
            items: items.into_iter().map(Into::into).collect(),
            total: order.total,
            status: order.status,
            shipping_address: order.shipping_address.into(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub message: String,
    pub order: OrderResponse,
}
