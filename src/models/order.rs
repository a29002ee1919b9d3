use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of an order.
///
/// Transitions go through the dedicated confirm/cancel/deliver
/// operations; the update endpoint rejects status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    /// Product id, absent when the product was since deleted
    #[serde(default)]
    pub product: Option<i64>,
    pub product_sku: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: Option<String>,
    pub dealer: i64,
    pub status: OrderStatus,
    pub total_amount: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
