//! In-memory [`CatalogStore`] implementation.
//!
//! Records are sharded per supermarket. Each shard is a `HashMap` behind its
//! own `std::sync::RwLock`, so writes to different supermarkets never wait on
//! each other. Records are stored as `Arc<PriceRecord>`: replacing one swaps
//! a pointer, and readers either see the old record or the new one.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{NormalizedKey, PriceRecord};

use super::{shares_token, CatalogStore};

type Shard = Arc<RwLock<HashMap<NormalizedKey, Arc<PriceRecord>>>>;

/// In-memory catalog for tests and the `memory` backend.
pub struct InMemoryStore {
    shards: RwLock<HashMap<String, Shard>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
        }
    }

    fn shard(&self, supermarket: &str) -> Result<Option<Shard>> {
        Ok(read(&self.shards)?.get(supermarket).cloned())
    }

    fn shard_or_create(&self, supermarket: &str) -> Result<Shard> {
        if let Some(shard) = self.shard(supermarket)? {
            return Ok(shard);
        }
        let mut shards = write(&self.shards)?;
        Ok(shards
            .entry(supermarket.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(HashMap::new())))
            .clone())
    }

    fn shard_records<T>(
        &self,
        supermarket: &str,
        f: impl FnOnce(&HashMap<NormalizedKey, Arc<PriceRecord>>) -> T,
    ) -> Result<Option<T>> {
        match self.shard(supermarket)? {
            Some(shard) => Ok(Some(f(&*read(&*shard)?))),
            None => Ok(None),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("catalog lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("catalog lock poisoned"))
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn upsert(&self, record: PriceRecord) -> Result<()> {
        let shard = self.shard_or_create(&record.supermarket)?;
        let mut records = write(&*shard)?;
        records.insert(record.normalized_key.clone(), Arc::new(record));
        Ok(())
    }

    async fn upsert_batch(&self, records: &[PriceRecord]) -> Result<()> {
        let mut by_supermarket: HashMap<&str, Vec<&PriceRecord>> = HashMap::new();
        for r in records {
            by_supermarket.entry(&r.supermarket).or_default().push(r);
        }

        // Lock every touched shard (in a fixed order) before writing, so the
        // batch lands all at once or not at all.
        let mut names: Vec<&str> = by_supermarket.keys().copied().collect();
        names.sort_unstable();
        let shards = names
            .iter()
            .map(|name| self.shard_or_create(name))
            .collect::<Result<Vec<_>>>()?;
        let mut guards = shards
            .iter()
            .map(|shard| write(&**shard))
            .collect::<Result<Vec<_>>>()?;

        for (name, guard) in names.iter().zip(guards.iter_mut()) {
            for r in &by_supermarket[name] {
                guard.insert(r.normalized_key.clone(), Arc::new((*r).clone()));
            }
        }
        Ok(())
    }

    async fn lookup(&self, supermarket: &str, key: &NormalizedKey) -> Result<Option<PriceRecord>> {
        Ok(self
            .shard_records(supermarket, |records| {
                records.get(key).map(|r| PriceRecord::clone(r))
            })?
            .flatten())
    }

    async fn supermarkets(&self) -> Result<BTreeSet<String>> {
        let shards = read(&self.shards)?;
        let mut out = BTreeSet::new();
        for (name, shard) in shards.iter() {
            if !read(&**shard)?.is_empty() {
                out.insert(name.clone());
            }
        }
        Ok(out)
    }

    async fn candidates_for(
        &self,
        supermarket: &str,
        tokens: &BTreeSet<&str>,
    ) -> Result<Vec<PriceRecord>> {
        Ok(self
            .shard_records(supermarket, |records| {
                records
                    .values()
                    .filter(|r| shares_token(&r.normalized_key, tokens))
                    .map(|r| PriceRecord::clone(r))
                    .collect()
            })?
            .unwrap_or_default())
    }

    async fn products(&self, supermarket: &str) -> Result<Vec<PriceRecord>> {
        let mut out: Vec<PriceRecord> = self
            .shard_records(supermarket, |records| {
                records.values().map(|r| PriceRecord::clone(r)).collect()
            })?
            .unwrap_or_default();
        out.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.normalized_key.cmp(&b.normalized_key))
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, tokens};
    use chrono::Utc;

    fn record(supermarket: &str, name: &str, price: i64) -> PriceRecord {
        PriceRecord {
            supermarket: supermarket.to_string(),
            normalized_key: normalize(name, None),
            display_name: name.to_string(),
            price,
            promotion: false,
            category: "outros".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryStore::new();
        store.upsert(record("A", "Rice 1kg", 500)).await.unwrap();
        store.upsert(record("A", "Rice 1kg", 450)).await.unwrap();

        let found = store
            .lookup("A", &normalize("rice", None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.price, 450);
        assert_eq!(store.products("A").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = InMemoryStore::new();
        let r = record("A", "Beans", 700);
        store.upsert(r.clone()).await.unwrap();
        store.upsert(r.clone()).await.unwrap();
        assert_eq!(store.products("A").await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn batch_later_record_wins() {
        let store = InMemoryStore::new();
        store
            .upsert_batch(&[
                record("B", "Milk", 400),
                record("A", "Milk", 420),
                record("B", "Milk", 390),
            ])
            .await
            .unwrap();

        let key = normalize("milk", None);
        assert_eq!(store.lookup("B", &key).await.unwrap().unwrap().price, 390);
        assert_eq!(store.lookup("A", &key).await.unwrap().unwrap().price, 420);
    }

    #[tokio::test]
    async fn unknown_supermarket_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.supermarkets().await.unwrap().is_empty());
        assert!(store
            .lookup("X", &normalize("rice", None))
            .await
            .unwrap()
            .is_none());
        assert!(store.products("X").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn candidates_share_a_token() {
        let store = InMemoryStore::new();
        store
            .upsert_batch(&[
                record("A", "Arroz Branco", 500),
                record("A", "Arroz Integral", 650),
                record("A", "Feijão Preto", 800),
                record("B", "Arroz Branco", 480),
            ])
            .await
            .unwrap();

        let key = normalize("arroz parboilizado", None);
        let mut found: Vec<String> = store
            .candidates_for("A", &tokens(&key))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.display_name)
            .collect();
        found.sort();
        assert_eq!(found, vec!["Arroz Branco", "Arroz Integral"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_see_whole_records() {
        let store = Arc::new(InMemoryStore::new());
        let key = normalize("arroz", None);
        let old = PriceRecord {
            display_name: "Arroz 5kg".to_string(),
            promotion: false,
            ..record("A", "Arroz", 2_490)
        };
        let new = PriceRecord {
            display_name: "Arroz 1kg oferta".to_string(),
            promotion: true,
            ..record("A", "Arroz", 599)
        };
        store.upsert(old.clone()).await.unwrap();

        let writer = {
            let store = store.clone();
            let (old, new) = (old.clone(), new.clone());
            tokio::spawn(async move {
                for i in 0..2_000 {
                    let r = if i % 2 == 0 { new.clone() } else { old.clone() };
                    store.upsert(r).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                let (old, new) = (old.clone(), new.clone());
                tokio::spawn(async move {
                    for _ in 0..2_000 {
                        let seen = store.lookup("A", &key).await.unwrap().unwrap();
                        assert!(seen == old || seen == new, "torn record: {:?}", seen);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
        assert_eq!(store.products("A").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn supermarkets_are_sorted() {
        let store = InMemoryStore::new();
        for sm in ["zeta", "alpha", "mid"] {
            store.upsert(record(sm, "Rice", 100)).await.unwrap();
        }
        let names: Vec<String> = store.supermarkets().await.unwrap().into_iter().collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
