use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run the migrations embedded in ./migrations/
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Seed the product catalog (idempotent — safe to call on every startup).
pub async fn seed_products(pool: &PgPool) -> anyhow::Result<()> {
    let products: [(&str, &str, &str, &str); 3] = [
        (
            "Solar panels",
            "Cut your costs with our energy efficient solar panels",
            "Our solar panels utilise cutting-edge technology to provide efficient, renewable energy solutions.",
            "/static/assets/product_icons/solarpanels.png",
        ),
        (
            "EV charging stations",
            "Go more hybrid than ever with our on demand EV charging stations",
            "Our EV charging stations are reliable, fast, and compatible with all modern electric vehicles.",
            "/static/assets/product_icons/evcharging.png",
        ),
        (
            "Smart home energy management",
            "Connect and optimise your energy usage with our smart home energy management systems",
            "Our smart home energy systems optimise electricity usage and provide intelligent device control.",
            "/static/assets/product_icons/smarthome.png",
        ),
    ];

    for (product_type, description, details, image) in products {
        sqlx::query(
            "INSERT INTO products (type, description, details, image)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (type) DO NOTHING",
        )
        .bind(product_type)
        .bind(description)
        .bind(details)
        .bind(image)
        .execute(pool)
        .await?;
    }
    Ok(())
}
