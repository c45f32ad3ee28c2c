//! Shopping-item to catalog matching.
//!
//! For every known supermarket the matcher tries, in order:
//!
//! 1. **Exact**: a record whose normalized key equals the item's key
//!    (brand included when the item has one).
//! 2. **Fuzzy**: the candidate with the highest Jaccard token overlap,
//!    accepted when the score reaches the configured threshold. Ties go to
//!    the cheaper record, then to the smaller key.
//!
//! An exact hit never competes with fuzzy candidates, so a brand-qualified
//! exact record wins even over a cheaper, closely scored fallback.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;

use crate::models::{MatchKind, PriceRecord, ShoppingItem};
use crate::normalize::{jaccard, normalize, tokens};
use crate::store::CatalogStore;

/// Default minimum Jaccard score for a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.5;

/// A catalog record chosen for a shopping item.
#[derive(Debug, Clone)]
pub struct Match {
    pub record: PriceRecord,
    pub kind: MatchKind,
    /// `1.0` for exact matches, the Jaccard score otherwise.
    pub score: f64,
}

/// Matches `item` against every known supermarket.
///
/// The map holds one entry per supermarket (ascending), `None` where
/// nothing cleared the threshold.
pub async fn match_item(
    store: &dyn CatalogStore,
    item: &ShoppingItem,
    threshold: f64,
) -> Result<BTreeMap<String, Option<Match>>> {
    let supermarkets = store.supermarkets().await?;
    let key = normalize(&item.name, item.brand.as_deref());

    let mut out = BTreeMap::new();
    if key.is_empty() {
        debug!(item = %item.name, "empty normalized key, nothing can match");
        for sm in supermarkets {
            out.insert(sm, None);
        }
        return Ok(out);
    }

    let wanted = tokens(&key);
    for sm in supermarkets {
        if let Some(record) = store.lookup(&sm, &key).await? {
            out.insert(
                sm,
                Some(Match {
                    record,
                    kind: MatchKind::Exact,
                    score: 1.0,
                }),
            );
            continue;
        }

        let best = store
            .candidates_for(&sm, &wanted)
            .await?
            .into_iter()
            .map(|record| {
                let score = jaccard(&wanted, &tokens(&record.normalized_key));
                (score, record)
            })
            .filter(|(score, _)| *score >= threshold)
            .min_by(|(sa, ra), (sb, rb)| rank_fallback(*sa, ra, *sb, rb));

        if let Some((score, record)) = &best {
            debug!(
                item = %item.name,
                supermarket = %sm,
                matched = %record.normalized_key,
                score,
                "fuzzy match"
            );
        }
        out.insert(
            sm,
            best.map(|(score, record)| Match {
                record,
                kind: MatchKind::Fuzzy,
                score,
            }),
        );
    }

    Ok(out)
}

/// Orders fallback candidates best-first: higher score, lower price,
/// smaller key.
fn rank_fallback(sa: f64, a: &PriceRecord, sb: f64, b: &PriceRecord) -> Ordering {
    sb.total_cmp(&sa)
        .then_with(|| a.price.cmp(&b.price))
        .then_with(|| a.normalized_key.cmp(&b.normalized_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::Utc;

    fn record(supermarket: &str, name: &str, brand: Option<&str>, price: i64) -> PriceRecord {
        PriceRecord {
            supermarket: supermarket.to_string(),
            normalized_key: normalize(name, brand),
            display_name: name.to_string(),
            price,
            promotion: false,
            category: "outros".to_string(),
            observed_at: Utc::now(),
        }
    }

    async fn store_with(records: Vec<PriceRecord>) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.upsert_batch(&records).await.unwrap();
        store
    }

    #[tokio::test]
    async fn exact_match_across_supermarkets() {
        let store = store_with(vec![
            record("A", "Arroz Tipo 1 5kg", None, 2_490),
            record("B", "ARROZ TIPO 1 - 5 KG", None, 2_390),
        ])
        .await;

        let matches = match_item(&store, &ShoppingItem::new("arroz tipo 1", 1), 0.5)
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        for m in matches.values() {
            let m = m.as_ref().unwrap();
            assert_eq!(m.kind, MatchKind::Exact);
            assert_eq!(m.score, 1.0);
        }
    }

    #[tokio::test]
    async fn fuzzy_fallback_respects_threshold() {
        let store = store_with(vec![
            record("A", "Arroz Branco Tipo 1", None, 2_490),
            record("B", "Feijão Carioca", None, 799),
        ])
        .await;

        let item = ShoppingItem::new("Arroz Tipo 1", 1);
        let matches = match_item(&store, &item, 0.5).await.unwrap();
        let a = matches["A"].as_ref().unwrap();
        assert_eq!(a.kind, MatchKind::Fuzzy);
        assert!((a.score - 0.75).abs() < 1e-9);
        assert!(matches["B"].is_none());

        let strict = match_item(&store, &item, 0.8).await.unwrap();
        assert!(strict["A"].is_none());
    }

    #[tokio::test]
    async fn fallback_ties_prefer_cheaper_then_smaller_key() {
        let store = store_with(vec![
            record("A", "Leite Integral Itambé", None, 529),
            record("A", "Leite Integral Piracanjuba", None, 499),
            record("A", "Leite Integral Elegê", None, 499),
        ])
        .await;

        let matches = match_item(&store, &ShoppingItem::new("Leite Integral", 1), 0.5)
            .await
            .unwrap();
        let m = matches["A"].as_ref().unwrap();
        assert_eq!(m.record.price, 499);
        assert_eq!(m.record.normalized_key.as_str(), "leite integral elege");
    }

    #[tokio::test]
    async fn brand_qualified_exact_beats_cheaper_fallback() {
        let name = "Arroz Agulhinha Tipo 1 Longo Fino Polido Branco Especial";
        let store = store_with(vec![
            record("A", name, Some("Camil"), 200),
            record("A", name, None, 150),
        ])
        .await;

        let item = ShoppingItem::new(name, 1).with_brand("Camil");
        let generic_score = jaccard(
            &tokens(&normalize(name, Some("Camil"))),
            &tokens(&normalize(name, None)),
        );
        assert!((generic_score - 0.9).abs() < 1e-9);

        let matches = match_item(&store, &item, 0.5).await.unwrap();
        let m = matches["A"].as_ref().unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.record.price, 200);
    }

    #[tokio::test]
    async fn empty_key_never_matches() {
        let store = store_with(vec![record("A", "Arroz", None, 500)]).await;
        let matches = match_item(&store, &ShoppingItem::new("500 g", 1), 0.5)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches["A"].is_none());
    }
}
