//! Shopping-list comparison.
//!
//! [`compare`] validates the whole list up front, then matches each item
//! independently and assembles one [`ComparisonResult`] per item, in input
//! order. Each result carries one quote per known supermarket (ascending)
//! and the cheapest found quote as `best_option`, ties going to the
//! smallest supermarket identifier.

use tracing::debug;

use crate::error::{CompareError, ValidationError};
use crate::matcher::{match_item, Match};
use crate::models::{ComparisonResult, ShoppingItem, SupermarketQuote};
use crate::store::CatalogStore;

/// Checks every item; the first offending one rejects the whole list.
pub fn validate(items: &[ShoppingItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyList);
    }
    for (index, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { index });
        }
        if item.quantity < 1 {
            return Err(ValidationError::InvalidQuantity {
                index,
                quantity: item.quantity,
            });
        }
    }
    Ok(())
}

/// Compares every item of a shopping list across all known supermarkets.
pub async fn compare(
    store: &dyn CatalogStore,
    items: &[ShoppingItem],
    threshold: f64,
) -> Result<Vec<ComparisonResult>, CompareError> {
    validate(items)?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let matches = match_item(store, item, threshold).await?;
        let results: Vec<SupermarketQuote> = matches
            .into_iter()
            .map(|(supermarket, m)| match m {
                Some(m) => quote(supermarket, m),
                None => SupermarketQuote::not_found(supermarket),
            })
            .collect();
        let best_option = best_option(&results).cloned();
        debug!(
            item = %item.name,
            supermarkets = results.len(),
            found = results.iter().filter(|q| q.found).count(),
            best = best_option.as_ref().map(|q| q.supermarket.as_str()).unwrap_or("-"),
            "compared item"
        );
        out.push(ComparisonResult {
            item: item.clone(),
            results,
            best_option,
        });
    }
    Ok(out)
}

fn quote(supermarket: String, m: Match) -> SupermarketQuote {
    SupermarketQuote {
        supermarket,
        found: true,
        price: Some(m.record.price),
        promotion: m.record.promotion,
        product_name: Some(m.record.display_name),
        match_kind: Some(m.kind),
        score: Some(m.score),
    }
}

/// Cheapest found quote; equal prices resolve to the smallest supermarket.
pub fn best_option(results: &[SupermarketQuote]) -> Option<&SupermarketQuote> {
    results
        .iter()
        .filter_map(|q| match (q.found, q.price) {
            (true, Some(price)) => Some((price, q)),
            _ => None,
        })
        .min_by(|(pa, qa), (pb, qb)| pa.cmp(pb).then_with(|| qa.supermarket.cmp(&qb.supermarket)))
        .map(|(_, q)| q)
}
