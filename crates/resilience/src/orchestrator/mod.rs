//! Fallback orchestration for catalog fetches.
//!
//! The [`FallbackOrchestrator`] is the single "get me the data" entry point:
//!
//! 1. Skip the provider when the host is offline or the provider is degraded
//! 2. Otherwise call the provider through the retry executor
//! 3. On success, record health and write the page through to the cache
//! 4. On failure, record health, then try the cache, then the placeholder
//!    generator
//!
//! Callers only see an error when both the cache and the generator fail.

mod diagnostics;
mod fallback;
mod traits;

pub use diagnostics::{AttemptOutcome, FetchDiagnostics, SkipReason, Tier, TierAttempt};
pub use fallback::{DataSource, FallbackOrchestrator, FetchError, FetchOutcome};
pub use traits::{CacheError, CatalogCache, CatalogProvider, GeneratorError, PlaceholderCatalog};
