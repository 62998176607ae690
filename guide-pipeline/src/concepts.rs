//! Fixed domain vocabulary referenced by the intent-classification prompt.

/// Key philosophical concepts of the Gita. Stage 1 offers the first ten as
/// examples; the model may tag outside the list.
pub const KEY_CONCEPTS: [&str; 20] = [
    "Dharma",
    "Karma Yoga",
    "Bhakti Yoga",
    "Jnana Yoga",
    "Dhyana Yoga",
    "Atman",
    "Brahman",
    "Maya",
    "Gunas",
    "Sthitaprajna",
    "Nishkama Karma",
    "Yoga",
    "Svadharma",
    "Moksha",
    "Prakriti",
    "Sankhya",
    "Tyaga",
    "Ishvara",
    "Samsara",
    "Vishvarupa",
];
