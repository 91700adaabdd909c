use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Read-only catalog row, seeded at setup. The `type` column is aliased to
/// `product_type` in queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub product_type: String,
    pub description: String,
    pub details: String,
    pub image: String,
}
