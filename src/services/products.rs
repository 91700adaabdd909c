use sqlx::PgPool;

use crate::{error::ApiError, models::product::Product};

pub struct ProductService;

impl ProductService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Product>, ApiError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, type AS product_type, description, details, image
             FROM products ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(products)
    }

    pub async fn find_by_type(
        pool: &PgPool,
        product_type: &str,
    ) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, type AS product_type, description, details, image
             FROM products WHERE type = $1",
        )
        .bind(product_type)
        .fetch_optional(pool)
        .await?;
        Ok(product)
    }
}
