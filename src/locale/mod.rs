//! Bilingual string lookup
//!
//! Symbolic keys map to localized strings through a static catalog. The active
//! locale lives in a [`LanguageContext`] that loads it once from a
//! [`KeyValueStore`](crate::store::KeyValueStore) and writes it back on every change.

pub mod catalog;
pub mod context;

pub use catalog::{translate, Locale};
pub use context::{LanguageContext, LANGUAGE_KEY};
