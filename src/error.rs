//! Error taxonomy for catalog operations.
//!
//! Fetch and whole-source parse failures are fatal to the operation that
//! triggered them; per-batch write failures are recoverable and surfaced as
//! counts instead (see `import::apply`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to fetch source: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to parse source CSV: {0}")]
    Csv(#[from] polars::prelude::PolarsError),

    #[error("storage error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
