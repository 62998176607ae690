//! Read-only access to the Bhagavad Gita verse corpus.
//!
//! The corpus is immutable reference data owned by an external source; this
//! crate only reads it. Exposes:
//! - [`Verse`] / [`Commentary`] records
//! - the [`VerseStore`] trait — the seam the pipeline depends on
//! - [`JsonVerseStore`] — loads the whole corpus from a JSON file once at
//!   startup and serves lookups from memory

pub mod error;
pub mod json_store;
pub mod store;
pub mod verse;

pub use error::StoreError;
pub use json_store::JsonVerseStore;
pub use store::VerseStore;
pub use verse::{Commentary, Verse};
