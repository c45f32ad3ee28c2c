//! Domain error types.
//!
//! Application plumbing (configuration, database, CLI) uses `anyhow`; the
//! errors here are the ones callers are expected to match on.

use thiserror::Error;

/// Fatal failure to open or decode an uploaded document.
///
/// Per-line parse problems are never reported through this type; they are
/// counted as skipped lines instead.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("document is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("spreadsheet extraction failed: {0}")]
    Spreadsheet(String),
}

/// A shopping list that cannot be compared.
///
/// The whole request is rejected; no partial results are produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("shopping list must not be empty")]
    EmptyList,

    #[error("item {index}: name must not be empty")]
    EmptyName { index: usize },

    #[error("item {index}: quantity must be >= 1 (got {quantity})")]
    InvalidQuantity { index: usize, quantity: i64 },
}

/// Failure of a comparison request.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Catalog read failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Failure of a document upload.
///
/// Whatever the variant, the catalog is left untouched.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("supermarket identifier must not be empty")]
    MissingSupermarket,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Catalog write failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
