//! Catalog storage abstraction.
//!
//! The [`CatalogStore`] trait holds the latest known price per
//! `(supermarket, normalized key)`. Matching and comparison only talk to
//! the trait, so the backend can be swapped without touching them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! | Backend | Module |
//! |---------|--------|
//! | [`InMemoryStore`] | [`memory`] |
//! | [`SqliteStore`] | [`sqlite`] |

pub mod memory;
pub mod sqlite;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::models::{NormalizedKey, PriceRecord};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Abstract catalog backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](CatalogStore::upsert) | Insert or replace one record |
/// | [`upsert_batch`](CatalogStore::upsert_batch) | Insert or replace many records, all or nothing |
/// | [`lookup`](CatalogStore::lookup) | Exact lookup by supermarket and key |
/// | [`supermarkets`](CatalogStore::supermarkets) | Every supermarket with at least one record |
/// | [`candidates_for`](CatalogStore::candidates_for) | Records sharing a token with a key |
/// | [`products`](CatalogStore::products) | Every record of one supermarket |
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or replace the record for `(record.supermarket, record.normalized_key)`.
    ///
    /// Last write wins; writing the same record twice leaves one copy.
    async fn upsert(&self, record: PriceRecord) -> Result<()>;

    /// Upsert every record, or none of them if the write fails.
    ///
    /// Within the batch, a later record for the same key replaces an earlier one.
    async fn upsert_batch(&self, records: &[PriceRecord]) -> Result<()>;

    async fn lookup(&self, supermarket: &str, key: &NormalizedKey) -> Result<Option<PriceRecord>>;

    async fn supermarkets(&self) -> Result<BTreeSet<String>>;

    /// Records of `supermarket` whose key shares at least one of `tokens`.
    async fn candidates_for(
        &self,
        supermarket: &str,
        tokens: &BTreeSet<&str>,
    ) -> Result<Vec<PriceRecord>>;

    /// All records of `supermarket`, ordered by display name.
    async fn products(&self, supermarket: &str) -> Result<Vec<PriceRecord>>;
}

/// Opens the backend selected in `[store] backend`.
///
/// The SQLite backend expects the schema to exist (`prh init`).
pub async fn open(config: &Config) -> Result<Arc<dyn CatalogStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackend::Sqlite => {
            let pool = crate::db::connect(config).await?;
            Ok(Arc::new(SqliteStore::new(pool)))
        }
    }
}

/// True when `key` contains at least one of `tokens`.
pub(crate) fn shares_token(key: &NormalizedKey, tokens: &BTreeSet<&str>) -> bool {
    key.as_str().split(' ').any(|t| tokens.contains(t))
}
