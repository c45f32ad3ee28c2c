//! # Price Harness
//!
//! A supermarket price catalog and shopping-list comparison engine.
//!
//! Price Harness extracts `(product, price, promotion)` entries from
//! supermarket price lists, keeps the latest price per product and
//! supermarket, and answers "where is each item on my list cheapest?"
//! through a CLI and an HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌───────────┐
//! │  Extractor  │──▶│ Normalizer  │──▶│  Catalog  │
//! │ TXT/PDF/XLSX│   │ + Category  │   │ Mem/SQLite│
//! └─────────────┘   └─────────────┘   └─────┬─────┘
//!                                           │
//!                  ┌─────────┐   ┌──────────┴──┐   ┌─────────┐
//! shopping list ──▶│ Matcher │──▶│ Comparator  │──▶│ Savings │
//!                  └─────────┘   └─────────────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! prh init
//! prh ingest flyer.pdf --supermarket bompreco
//! prh compare --item "Arroz Tipo 1:2"
//! prh serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Domain error types |
//! | [`money`] | Monetary amount recognition |
//! | [`extract`] | Price-list document extraction |
//! | [`normalize`] | Product-name normalization |
//! | [`category`] | Product categorization |
//! | [`store`] | Catalog storage (in-memory and SQLite) |
//! | [`matcher`] | Exact and fuzzy item matching |
//! | [`compare`] | Shopping-list comparison |
//! | [`savings`] | Estimated savings |
//! | [`ingest`] | Ingestion pipeline |
//! | [`compare_cmd`] | Catalog query commands |
//! | [`server`] | HTTP API server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod category;
pub mod compare;
pub mod compare_cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod matcher;
pub mod migrate;
pub mod models;
pub mod money;
pub mod normalize;
pub mod savings;
pub mod server;
pub mod store;
