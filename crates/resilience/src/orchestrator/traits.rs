//! Collaborator traits for the three tiers of the fallback chain.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CatalogPage, CatalogQuery};
use crate::errors::UpstreamError;
use crate::store::StoreError;

/// Errors raised by a [`CatalogCache`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache store failed: {0}")]
    Store(#[from] StoreError),

    /// A cached entry could not be decoded.
    #[error("Cache entry corrupt: {0}")]
    Corrupt(String),

    #[error("Cache backend failed: {0}")]
    Backend(String),
}

/// Error raised by a [`PlaceholderCatalog`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Placeholder generation failed: {0}")]
pub struct GeneratorError(pub String);

/// The primary, unreliable catalog provider.
///
/// Implementations wrap a concrete transport and convert its failures into
/// [`UpstreamError`]. Deadlines are the implementation's responsibility; the
/// orchestrator never aborts a call on its own.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Dependency name used for health tracking and error log context.
    fn id(&self) -> &str;

    async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage, UpstreamError>;
}

/// Secondary tier: previously fetched pages.
#[async_trait]
pub trait CatalogCache: Send + Sync {
    async fn get(&self, query: &CatalogQuery) -> Result<Option<CatalogPage>, CacheError>;

    async fn put(&self, query: &CatalogQuery, page: &CatalogPage) -> Result<(), CacheError>;
}

/// Tertiary tier: synthetic data. Expected never to fail.
pub trait PlaceholderCatalog: Send + Sync {
    fn generate(&self, query: &CatalogQuery) -> Result<CatalogPage, GeneratorError>;
}
