//! JSON-file-backed verse store.
//!
//! The corpus ships as a single JSON document:
//!
//! ```json
//! {
//!   "verses": [
//!     { "verse_id": "BG2.47", "chapter": 2, "verse": 47,
//!       "sanskrit": "...", "transliteration": "...", "translation": "..." }
//!   ],
//!   "commentaries": [
//!     { "verse_id": "BG2.47", "author_name": "...", "commentary": "..." }
//!   ]
//! }
//! ```
//!
//! The whole file is loaded once at startup; lookups are served from memory.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::{Commentary, StoreError, Verse, VerseStore};

/// On-disk corpus document.
#[derive(Debug, Deserialize)]
struct CorpusFile {
    verses: Vec<Verse>,
    #[serde(default)]
    commentaries: Vec<Commentary>,
}

/// In-memory corpus loaded from a JSON file.
#[derive(Debug)]
pub struct JsonVerseStore {
    verses: Vec<Verse>,
    commentaries: HashMap<String, Vec<Commentary>>,
}

impl JsonVerseStore {
    /// Loads the corpus from `path`.
    ///
    /// Verses are re-sorted by chapter/verse so callers can rely on corpus
    /// order regardless of file order.
    ///
    /// # Errors
    /// - [`StoreError::Io`] if the file cannot be read
    /// - [`StoreError::Parse`] if it is not valid corpus JSON
    /// - [`StoreError::Corrupt`] on duplicate verse ids
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: CorpusFile = serde_json::from_str(&raw)?;

        let store = Self::from_parts(file.verses, file.commentaries)?;
        info!(
            path = %path.as_ref().display(),
            verses = store.verses.len(),
            "verse corpus loaded"
        );
        Ok(store)
    }

    /// Builds a store directly from records (used by tests and tools).
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] on duplicate verse ids.
    pub fn from_parts(
        mut verses: Vec<Verse>,
        commentaries: Vec<Commentary>,
    ) -> Result<Self, StoreError> {
        verses.sort_by_key(|v| (v.chapter, v.verse));

        let mut seen = std::collections::HashSet::new();
        for v in &verses {
            if !seen.insert(v.verse_id.clone()) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate verse id: {}",
                    v.verse_id
                )));
            }
        }

        let mut by_verse: HashMap<String, Vec<Commentary>> = HashMap::new();
        for c in commentaries {
            by_verse.entry(c.verse_id.clone()).or_default().push(c);
        }

        Ok(Self {
            verses,
            commentaries: by_verse,
        })
    }

    /// Number of verses in the corpus.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// True when the corpus holds no verses.
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

#[async_trait]
impl VerseStore for JsonVerseStore {
    async fn list_verses(&self) -> Result<Vec<Verse>, StoreError> {
        Ok(self.verses.clone())
    }

    async fn commentary_for(
        &self,
        verse_id: &str,
        limit: usize,
    ) -> Result<Vec<Commentary>, StoreError> {
        Ok(self
            .commentaries
            .get(verse_id)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(id: &str, chapter: u32, verse: u32) -> Verse {
        Verse {
            verse_id: id.to_string(),
            chapter,
            verse,
            sanskrit: "कर्मण्येवाधिकारस्ते".to_string(),
            transliteration: "karmaṇy evādhikāras te".to_string(),
            translation: "You have a right to perform your duty.".to_string(),
        }
    }

    fn commentary(id: &str, author: &str) -> Commentary {
        Commentary {
            verse_id: id.to_string(),
            author_name: author.to_string(),
            commentary: "On action without attachment.".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_verses_in_corpus_order() {
        let store = JsonVerseStore::from_parts(
            vec![verse("BG3.1", 3, 1), verse("BG2.47", 2, 47)],
            vec![],
        )
        .unwrap();

        let verses = store.list_verses().await.unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0].verse_id, "BG2.47");
        assert_eq!(verses[1].verse_id, "BG3.1");
    }

    #[tokio::test]
    async fn commentary_lookup_respects_limit_and_unknown_ids() {
        let store = JsonVerseStore::from_parts(
            vec![verse("BG2.47", 2, 47)],
            vec![
                commentary("BG2.47", "Shankara"),
                commentary("BG2.47", "Ramanuja"),
            ],
        )
        .unwrap();

        let one = store.commentary_for("BG2.47", 1).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].author_name, "Shankara");

        let none = store.commentary_for("BG9.99", 5).await.unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn duplicate_verse_ids_are_rejected() {
        let err = JsonVerseStore::from_parts(
            vec![verse("BG2.47", 2, 47), verse("BG2.47", 2, 47)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn loads_corpus_from_file() {
        let doc = r#"{
            "verses": [
                { "verse_id": "BG2.47", "chapter": 2, "verse": 47,
                  "sanskrit": "s", "transliteration": "t", "translation": "tr" }
            ],
            "commentaries": [
                { "verse_id": "BG2.47", "author_name": "Shankara", "commentary": "c" }
            ]
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, doc).unwrap();

        let store = JsonVerseStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
    }
}
