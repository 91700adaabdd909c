use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{services::products::ProductService, AppState};

/// GET /api/products — public catalog, keyed by product type.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let products = ProductService::list(&state.db).await.map_err(|e| {
        e.log();
        (e.status(), Json(json!({ "error": e.to_string() })))
    })?;

    let mut data = serde_json::Map::new();
    for product in products {
        data.insert(
            product.product_type,
            json!({
                "extra": product.description,
                "image": product.image,
                "details": product.details,
            }),
        );
    }
    Ok(Json(Value::Object(data)))
}
