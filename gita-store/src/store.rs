use async_trait::async_trait;

use crate::{Commentary, StoreError, Verse};

/// Read-only verse corpus access.
///
/// Implementations must be cheap to call repeatedly: the pipeline lists the
/// full corpus once per request and then fetches commentary only for the
/// handful of selected verses. No locking discipline is required — the
/// corpus is never mutated.
#[async_trait]
pub trait VerseStore: Send + Sync {
    /// Returns every verse in the corpus, ordered by chapter and verse.
    async fn list_verses(&self) -> Result<Vec<Verse>, StoreError>;

    /// Returns up to `limit` commentaries for `verse_id`.
    ///
    /// An unknown `verse_id` yields an empty list, not an error.
    async fn commentary_for(
        &self,
        verse_id: &str,
        limit: usize,
    ) -> Result<Vec<Commentary>, StoreError>;
}
