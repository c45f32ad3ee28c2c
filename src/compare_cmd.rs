//! Catalog query commands: `prh compare`, `prh supermarkets`, `prh products`.
//!
//! Reports are printed to stdout; `--json` switches to machine-readable
//! output with the same shapes the HTTP API returns.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::compare::compare;
use crate::config::Config;
use crate::models::{ComparisonResult, ShoppingItem, SupermarketQuote};
use crate::money::format_cents;
use crate::savings::{item_savings, total_savings};
use crate::store;

/// Parses `NAME[:QTY[:BRAND]]`, e.g. `Arroz:2:Tio João`.
pub fn parse_item(s: &str) -> Result<ShoppingItem, String> {
    let mut parts = s.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("invalid item '{}': name must not be empty", s));
    }
    let quantity = match parts.next().map(str::trim) {
        None | Some("") => 1,
        Some(q) => q
            .parse::<i64>()
            .map_err(|_| format!("invalid item '{}': quantity '{}' is not a number", s, q))?,
    };
    let brand = parts
        .next()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);
    Ok(ShoppingItem {
        name: name.to_string(),
        quantity,
        brand,
    })
}

/// Loads a shopping list from a JSON file (an array of items).
fn load_list(path: &Path) -> Result<Vec<ShoppingItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shopping list: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse shopping list: {}", path.display()))
}

pub async fn run_compare(
    config: &Config,
    list: Option<&Path>,
    items: Vec<ShoppingItem>,
    as_json: bool,
) -> Result<()> {
    let mut all = match list {
        Some(path) => load_list(path)?,
        None => Vec::new(),
    };
    all.extend(items);
    if all.is_empty() {
        bail!("Nothing to compare. Pass a shopping-list file or at least one --item.");
    }

    let store = store::open(config).await?;
    let results = compare(store.as_ref(), &all, config.matching.fuzzy_threshold).await?;
    let total = total_savings(&results);

    if as_json {
        let body = json!({ "results": results, "total_savings": total });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("compare ({} items)", results.len());
    for result in &results {
        print_result(result);
    }
    println!();
    println!("total savings: {}", format_cents(total));
    Ok(())
}

fn print_result(result: &ComparisonResult) {
    let item = &result.item;
    println!();
    match &item.brand {
        Some(brand) => println!("  {} [{}] x{}", item.name, brand, item.quantity),
        None => println!("  {} x{}", item.name, item.quantity),
    }
    if result.results.is_empty() {
        println!("    (catalog is empty)");
        return;
    }

    let best = result.best_option.as_ref().map(|q| q.supermarket.as_str());
    for quote in &result.results {
        println!("    {}", quote_line(quote, best == Some(quote.supermarket.as_str())));
    }
    if let Some(saving) = item_savings(result) {
        println!("    saving: {}", format_cents(saving));
    }
}

fn quote_line(quote: &SupermarketQuote, is_best: bool) -> String {
    let Some(price) = quote.price.filter(|_| quote.found) else {
        return format!("{:<20} {:>10}", quote.supermarket, "-");
    };
    let mut line = format!("{:<20} {:>10}", quote.supermarket, format_cents(price));
    if let Some(name) = &quote.product_name {
        line.push_str(&format!("  {}", name));
    }
    if quote.promotion {
        line.push_str("  (promo)");
    }
    if is_best {
        line.push_str("  *best");
    }
    line
}

pub async fn run_supermarkets(config: &Config) -> Result<()> {
    let store = store::open(config).await?;
    let supermarkets = store.supermarkets().await?;

    println!("Supermarkets ({})", supermarkets.len());
    for sm in &supermarkets {
        let count = store.products(sm).await?.len();
        println!("  {:<24} {:>6} products", sm, count);
    }
    Ok(())
}

pub async fn run_products(config: &Config, supermarket: &str, as_json: bool) -> Result<()> {
    let store = store::open(config).await?;
    let products = store.products(supermarket).await?;

    if as_json {
        let body = json!({
            "supermarket": supermarket,
            "products": products,
            "count": products.len(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Products at {} ({})", supermarket, products.len());
    if products.is_empty() {
        return Ok(());
    }
    println!(
        "  {:<40} {:>10}  {:<5}  {}",
        "PRODUCT", "PRICE", "PROMO", "CATEGORY"
    );
    println!("  {}", "-".repeat(72));
    for p in &products {
        println!(
            "  {:<40} {:>10}  {:<5}  {}",
            p.display_name,
            format_cents(p.price),
            if p.promotion { "yes" } else { "" },
            p.category
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_item_specs() {
        assert_eq!(parse_item("Arroz").unwrap(), ShoppingItem::new("Arroz", 1));
        assert_eq!(parse_item("Arroz:3").unwrap(), ShoppingItem::new("Arroz", 3));
        assert_eq!(
            parse_item("Arroz:2:Tio João").unwrap(),
            ShoppingItem::new("Arroz", 2).with_brand("Tio João")
        );
        assert_eq!(
            parse_item(" Feijão ::Camil ").unwrap(),
            ShoppingItem::new("Feijão", 1).with_brand("Camil")
        );
    }

    #[test]
    fn rejects_bad_item_specs() {
        assert!(parse_item("").is_err());
        assert!(parse_item(":2").is_err());
        assert!(parse_item("Arroz:two").is_err());
    }

    #[test]
    fn quote_lines_mark_best_and_promo() {
        let quote = SupermarketQuote {
            found: true,
            price: Some(1_290),
            promotion: true,
            product_name: Some("Arroz 5kg".into()),
            ..SupermarketQuote::not_found("bompreco")
        };
        let line = quote_line(&quote, true);
        assert!(line.contains("12.90"));
        assert!(line.contains("(promo)"));
        assert!(line.ends_with("*best"));

        let missing = quote_line(&SupermarketQuote::not_found("acme"), false);
        assert!(missing.trim_end().ends_with('-'));
    }
}
