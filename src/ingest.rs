//! Ingestion pipeline orchestration.
//!
//! Coordinates the upload flow: extraction → normalization →
//! categorization → catalog upsert. The CPU-bound half ([`prepare`]) is
//! synchronous so the server can run it on a blocking thread; the write
//! half ([`commit`]) is a single all-or-nothing batch.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::category::categorize;
use crate::config::{Config, StoreBackend};
use crate::error::IngestError;
use crate::extract::{content_type_for_path, extract, ExtractOptions};
use crate::models::{NormalizedKey, PriceRecord};
use crate::normalize::normalize;
use crate::store::{self, CatalogStore};

/// Summary of one ingested document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngestReport {
    pub supermarket: String,
    /// SHA-256 of the uploaded bytes.
    pub fingerprint: String,
    pub lines_total: usize,
    /// Entries that made it into the catalog batch.
    pub accepted: usize,
    pub skipped: usize,
    pub duplicates: usize,
    /// Distinct catalog keys written.
    pub records: usize,
}

/// An extracted document ready to be written.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub records: Vec<PriceRecord>,
    pub report: IngestReport,
}

/// Extracts, normalizes, and categorizes a document without touching the catalog.
///
/// Entries whose name normalizes to the empty key can never be matched and
/// are counted as skipped. When several entries share a key, the later one
/// wins, as it would in the catalog.
pub fn prepare(
    document: &[u8],
    content_type: &str,
    supermarket: &str,
    opts: &ExtractOptions,
    observed_at: DateTime<Utc>,
) -> Result<Prepared, IngestError> {
    let supermarket = supermarket.trim();
    if supermarket.is_empty() {
        return Err(IngestError::MissingSupermarket);
    }

    let extraction = extract(document, content_type, supermarket, opts)?;

    let mut unkeyed = 0;
    let mut by_key: HashMap<NormalizedKey, usize> = HashMap::new();
    let mut records: Vec<PriceRecord> = Vec::with_capacity(extraction.entries.len());
    for entry in &extraction.entries {
        let key = normalize(&entry.name, None);
        if key.is_empty() {
            unkeyed += 1;
            continue;
        }
        let record = PriceRecord {
            supermarket: supermarket.to_string(),
            category: categorize(&key).to_string(),
            normalized_key: key.clone(),
            display_name: entry.name.clone(),
            price: entry.price,
            promotion: entry.promotion,
            observed_at,
        };
        match by_key.get(&key) {
            Some(&idx) => records[idx] = record,
            None => {
                by_key.insert(key, records.len());
                records.push(record);
            }
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(document);
    let fingerprint = format!("{:x}", hasher.finalize());

    let report = IngestReport {
        supermarket: supermarket.to_string(),
        fingerprint,
        lines_total: extraction.lines_total,
        accepted: extraction.accepted() - unkeyed,
        skipped: extraction.skipped + unkeyed,
        duplicates: extraction.duplicates,
        records: records.len(),
    };
    Ok(Prepared { records, report })
}

/// Writes a prepared document to the catalog in one batch.
pub async fn commit(store: &dyn CatalogStore, prepared: Prepared) -> Result<IngestReport> {
    store
        .upsert_batch(&prepared.records)
        .await
        .with_context(|| {
            format!(
                "Failed to write {} catalog records for '{}'",
                prepared.records.len(),
                prepared.report.supermarket
            )
        })?;

    let r = &prepared.report;
    info!(
        supermarket = %r.supermarket,
        accepted = r.accepted,
        skipped = r.skipped,
        duplicates = r.duplicates,
        records = r.records,
        "ingested document"
    );
    Ok(prepared.report)
}

/// Extracts a document and merges it into the catalog.
pub async fn ingest_document(
    store: &dyn CatalogStore,
    document: &[u8],
    content_type: &str,
    supermarket: &str,
    opts: &ExtractOptions,
) -> Result<IngestReport, IngestError> {
    let prepared = prepare(document, content_type, supermarket, opts, Utc::now())?;
    Ok(commit(store, prepared).await?)
}

/// `prh ingest`: reads a file and ingests it for `supermarket`.
pub async fn run_ingest(
    config: &Config,
    path: &Path,
    supermarket: &str,
    content_type: Option<&str>,
) -> Result<()> {
    let content_type = match content_type {
        Some(ct) => ct,
        None => match content_type_for_path(path) {
            Some(ct) => ct,
            None => bail!(
                "Cannot infer content type of {}. Pass --content-type (text/plain, text/csv, application/pdf, or xlsx).",
                path.display()
            ),
        },
    };

    if config.store.backend == StoreBackend::Memory {
        warn!("store.backend is 'memory': ingested records are discarded when the command exits");
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let store = store::open(config).await?;
    let report = ingest_document(
        store.as_ref(),
        &bytes,
        content_type,
        supermarket,
        &config.extraction.options(),
    )
    .await
    .with_context(|| format!("Failed to ingest {}", path.display()))?;

    println!("ingest {} ({})", report.supermarket, path.display());
    println!("  content type: {}", content_type);
    println!("  fingerprint: {}", report.fingerprint);
    println!("  lines: {}", report.lines_total);
    println!("  accepted: {}", report.accepted);
    println!("  skipped: {}", report.skipped);
    println!("  duplicates: {}", report.duplicates);
    println!("  records written: {}", report.records);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::extract::MIME_TEXT;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn ingests_and_categorizes() {
        let store = InMemoryStore::new();
        let doc = "Arroz Tipo 1 5kg R$ 24,90\nLeite Integral 1L oferta 4,99\nPágina 1";
        let report = ingest_document(&store, doc.as_bytes(), MIME_TEXT, " bompreco ", &ExtractOptions::default())
            .await
            .unwrap();

        assert_eq!(report.supermarket, "bompreco");
        assert_eq!(report.lines_total, 3);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.records, 2);
        assert_eq!(report.fingerprint.len(), 64);

        let products = store.products("bompreco").await.unwrap();
        assert_eq!(products.len(), 2);
        let milk = products
            .iter()
            .find(|r| r.normalized_key.as_str() == "leite integral")
            .unwrap();
        assert!(milk.promotion);
        assert_eq!(milk.category, "laticinios");
        assert_eq!(milk.price, 499);
    }

    #[tokio::test]
    async fn later_entry_for_same_key_wins() {
        let store = InMemoryStore::new();
        let doc = "Arroz 5kg 24,90\nArroz 1kg 5,99";
        let report = ingest_document(&store, doc.as_bytes(), MIME_TEXT, "acme", &ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.records, 1);
        let products = store.products("acme").await.unwrap();
        assert_eq!(products[0].price, 599);
    }

    #[tokio::test]
    async fn extraction_failure_leaves_catalog_untouched() {
        let store = InMemoryStore::new();
        let err = ingest_document(&store, b"not a valid pdf", "application/pdf", "acme", &ExtractOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Extraction(ExtractionError::Pdf(_))));
        assert!(store.supermarkets().await.unwrap().is_empty());
    }

    #[test]
    fn blank_supermarket_is_rejected() {
        let err = prepare(b"Arroz 5,00", MIME_TEXT, "  ", &ExtractOptions::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingSupermarket));
    }
}
