use serde::{Deserialize, Serialize};

/// One verse of the corpus.
///
/// Identity is `verse_id`, a chapter/verse composite like `"BG2.47"`.
/// All fields are immutable reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verse {
    /// Unique verse identifier (e.g., `"BG2.47"`).
    pub verse_id: String,
    /// Chapter number (1-18).
    pub chapter: u32,
    /// Verse number within the chapter.
    pub verse: u32,
    /// Original Sanskrit text in Devanagari.
    pub sanskrit: String,
    /// Romanized transliteration.
    pub transliteration: String,
    /// English translation.
    pub translation: String,
}

/// One commentary attached to exactly one verse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commentary {
    /// Verse this commentary belongs to.
    pub verse_id: String,
    /// Commentator name.
    pub author_name: String,
    /// Free-text commentary body.
    pub commentary: String,
}
