use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Latest price per (supermarket, product key)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prices (
            supermarket TEXT NOT NULL,
            normalized_key TEXT NOT NULL,
            display_name TEXT NOT NULL,
            price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
            promotion INTEGER NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT 'outros',
            observed_at TEXT NOT NULL,
            PRIMARY KEY (supermarket, normalized_key)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_prices_category ON prices(category)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
