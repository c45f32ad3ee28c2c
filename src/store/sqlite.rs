//! SQLite-backed [`CatalogStore`] implementation.
//!
//! One row per `(supermarket, normalized_key)` in the `prices` table (see
//! [`migrate`](crate::migrate)). Upserts use `ON CONFLICT DO UPDATE`, and a
//! batch is written inside a single transaction.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::models::{NormalizedKey, PriceRecord};

use super::{shares_token, CatalogStore};

const SELECT_COLUMNS: &str = "SELECT supermarket, normalized_key, display_name, price_cents, \
                              promotion, category, observed_at FROM prices";

/// SQLite implementation of the [`CatalogStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_record(row: &SqliteRow) -> Result<PriceRecord> {
    let observed: String = row.get("observed_at");
    let observed_at = DateTime::parse_from_rfc3339(&observed)
        .with_context(|| format!("Invalid observed_at in catalog: {}", observed))?
        .with_timezone(&Utc);
    Ok(PriceRecord {
        supermarket: row.get("supermarket"),
        normalized_key: NormalizedKey::from_canonical(row.get("normalized_key")),
        display_name: row.get("display_name"),
        price: row.get("price_cents"),
        promotion: row.get("promotion"),
        category: row.get("category"),
        observed_at,
    })
}

fn upsert_query(record: &PriceRecord) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO prices (supermarket, normalized_key, display_name, price_cents,
                            promotion, category, observed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(supermarket, normalized_key) DO UPDATE SET
            display_name = excluded.display_name,
            price_cents = excluded.price_cents,
            promotion = excluded.promotion,
            category = excluded.category,
            observed_at = excluded.observed_at
        "#,
    )
    .bind(&record.supermarket)
    .bind(record.normalized_key.as_str())
    .bind(&record.display_name)
    .bind(record.price)
    .bind(record.promotion)
    .bind(&record.category)
    .bind(format_ts(&record.observed_at))
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn upsert(&self, record: PriceRecord) -> Result<()> {
        upsert_query(&record).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_batch(&self, records: &[PriceRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            upsert_query(record).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn lookup(&self, supermarket: &str, key: &NormalizedKey) -> Result<Option<PriceRecord>> {
        let row = sqlx::query(&format!(
            "{} WHERE supermarket = ? AND normalized_key = ?",
            SELECT_COLUMNS
        ))
        .bind(supermarket)
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn supermarkets(&self) -> Result<BTreeSet<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT supermarket FROM prices ORDER BY supermarket")
                .fetch_all(&self.pool)
                .await?;
        Ok(names.into_iter().collect())
    }

    async fn candidates_for(
        &self,
        supermarket: &str,
        tokens: &BTreeSet<&str>,
    ) -> Result<Vec<PriceRecord>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!("{} WHERE supermarket = ?", SELECT_COLUMNS))
            .bind(supermarket)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::new();
        for row in &rows {
            let record = row_to_record(row)?;
            if shares_token(&record.normalized_key, tokens) {
                out.push(record);
            }
        }
        Ok(out)
    }

    async fn products(&self, supermarket: &str) -> Result<Vec<PriceRecord>> {
        let rows = sqlx::query(&format!(
            "{} WHERE supermarket = ? ORDER BY display_name, normalized_key",
            SELECT_COLUMNS
        ))
        .bind(supermarket)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_record).collect()
    }
}
