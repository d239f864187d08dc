//! Catalog domain: queries, pages of sample metadata, and the two fallback
//! tiers used when the provider cannot answer (a store-backed cache and a
//! synthetic placeholder generator).

mod cache;
mod models;
mod synthetic;

pub use cache::{StoreCatalogCache, DEFAULT_CACHE_PREFIX};
pub use models::{CatalogPage, CatalogQuery, SampleMetadata};
pub use synthetic::SyntheticCatalog;
