//! Product catalog seed script
//!
//! Applies migrations and inserts the three catalog products if they are
//! not already present. Safe to re-run.
//!
//! Usage:
//!   DATABASE_URL=... ./seed-products

use std::env;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use rolsa_api::db::{run_migrations, seed_products};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;

    println!("=== Seed Product Catalog ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;
    seed_products(&pool).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    println!("Catalog ready: {count} products");

    Ok(())
}
