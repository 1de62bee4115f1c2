use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Cod,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            "cod" => Ok(PaymentMethod::Cod),
            other => Err(format!("Invalid payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Cash on delivery stays pending; card and PayPal are settled at checkout.
    pub fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cod => PaymentStatus::Pending,
            PaymentMethod::Card | PaymentMethod::Paypal => PaymentStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    /// Catalog product; absent for custom candles
    pub product: Option<ObjectId>,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub is_custom: bool,
    pub color: Option<String>,
    pub scent: Option<String>,
    pub size: Option<String>,
    pub shape: Option<String>,
    pub color_name: Option<String>,
    pub scent_name: Option<String>,
    pub size_name: Option<String>,
    pub shape_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub order_number: String,
    pub user: ObjectId,
    pub items: Vec<ObjectId>,
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Order {
    /// `ORD-` followed by the sequence number, zero-padded to four digits.
    pub fn format_number(sequence: u64) -> String {
        format!("ORD-{:04}", sequence)
    }

    pub fn parse_sequence(order_number: &str) -> Option<u64> {
        order_number.strip_prefix("ORD-")?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_padding() {
        assert_eq!(Order::format_number(1), "ORD-0001");
        assert_eq!(Order::format_number(42), "ORD-0042");
        assert_eq!(Order::format_number(12345), "ORD-12345");
    }

    #[test]
    fn test_order_number_parse() {
        assert_eq!(Order::parse_sequence("ORD-0042"), Some(42));
        assert_eq!(Order::parse_sequence("ORD-12345"), Some(12345));
        assert_eq!(Order::parse_sequence("42"), None);
        assert_eq!(Order::parse_sequence("ORD-x"), None);
    }

    #[test]
    fn test_payment_status_follows_method() {
        assert_eq!(PaymentStatus::initial_for(PaymentMethod::Cod), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::initial_for(PaymentMethod::Card), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::initial_for(PaymentMethod::Paypal), PaymentStatus::Completed);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }
}
