use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product catalog entry.
///
/// Monetary amounts arrive as decimal strings and are passed through
/// unparsed; the client does no arithmetic on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub description: String,
    pub price: String,
    pub active: bool,
    /// Current stock level, absent when no inventory record exists
    #[serde(default)]
    pub stock: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stock level row from the admin inventory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub quantity: i64,
}
