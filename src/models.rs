//! Core data models used throughout Price Harness.
//!
//! These types represent the shopping-list items, catalog records, and
//! comparison results that flow through the ingestion and query pipelines.
//! Every monetary amount is an integer number of minor units (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integer minor-unit amount (cents).
pub type Cents = i64;

/// One line of a shopping list, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

impl ShoppingItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            brand: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }
}

/// Canonical comparison key for a product name (plus optional brand).
///
/// The empty key is a sentinel produced when nothing survives
/// normalization; it never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub(crate) fn from_canonical(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest known price of one product at one supermarket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub supermarket: String,
    pub normalized_key: NormalizedKey,
    /// Product text as it appeared in the source document.
    pub display_name: String,
    pub price: Cents,
    pub promotion: bool,
    pub category: String,
    pub observed_at: DateTime<Utc>,
}

/// How a catalog record was matched to a shopping item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// One supermarket's answer for one shopping item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupermarketQuote {
    pub supermarket: String,
    pub found: bool,
    pub price: Option<Cents>,
    pub promotion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SupermarketQuote {
    pub fn not_found(supermarket: impl Into<String>) -> Self {
        Self {
            supermarket: supermarket.into(),
            found: false,
            price: None,
            promotion: false,
            product_name: None,
            match_kind: None,
            score: None,
        }
    }
}

/// Comparison outcome for a single shopping item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub item: ShoppingItem,
    /// One quote per known supermarket, ordered by supermarket identifier.
    pub results: Vec<SupermarketQuote>,
    pub best_option: Option<SupermarketQuote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_defaults_to_one() {
        let item: ShoppingItem = serde_json::from_str(r#"{"name":"Arroz"}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.brand, None);
    }

    #[test]
    fn not_found_quote_serializes_null_price() {
        let quote = SupermarketQuote::not_found("acme");
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["found"], false);
        assert!(json["price"].is_null());
        assert!(json.get("product_name").is_none());
    }
}
