//! Typed error for the gita-store crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Corpus file could not be read.
    #[error("[Gita Store] io error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus file is not valid JSON of the expected shape.
    #[error("[Gita Store] parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Corpus content violates an invariant (e.g., duplicate verse ids).
    #[error("[Gita Store] corrupt corpus: {0}")]
    Corrupt(String),
}
