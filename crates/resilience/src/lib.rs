//! SampleHub Resilience Crate
//!
//! This crate keeps the SampleHub catalog usable while its external sample
//! provider is slow, rate-limited, out of quota or offline.
//!
//! # Overview
//!
//! The resilience crate supports:
//! - Classification of raw provider failures into a closed [`ErrorKind`] taxonomy
//! - Retries with capped exponential backoff and jitter
//! - Per-dependency health tracking that short-circuits a failing provider
//! - A bounded, persisted diagnostic error log
//! - A fallback chain: provider, then cache, then placeholder data
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  Caller (UI/CLI) |
//! +------------------+
//!          |
//!          v
//! +----------------------+     +------------------------+
//! | FallbackOrchestrator | --> |  ServiceHealthTracker  |  (admit / record)
//! +----------------------+     +------------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  RetryExecutor   | --> |  ErrorClassifier |  (kind, retryable, fallback)
//! +------------------+     +------------------+
//!          |                        |
//!          v                        v
//! +------------------+     +------------------+
//! | CatalogProvider  |     |     ErrorLog     |  (bounded, persisted)
//! +------------------+     +------------------+
//!          |
//!          v  (on failure)
//! +------------------+     +--------------------+
//! |   CatalogCache   | --> | PlaceholderCatalog |
//! +------------------+     +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`UpstreamError`] - Raw failure reported by a provider call
//! - [`ErrorClassification`] - Retry/fallback decision for a failure
//! - [`RetryPolicy`] - Backoff parameters supplied per call site
//! - [`HealthState`] - Available, degraded or probing
//! - [`ErrorRecord`] - One entry in the diagnostic log
//! - [`FetchOutcome`] - Data plus the tier that served it

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod errors;
pub mod health;
pub mod orchestrator;
pub mod retry;
pub mod store;

pub use catalog::{CatalogPage, CatalogQuery, SampleMetadata, StoreCatalogCache, SyntheticCatalog};
pub use config::ResilienceConfig;
pub use diagnostics::{
    ErrorDetails, ErrorLog, ErrorLogConfig, ErrorMetadata, ErrorRecord, ErrorReporter,
    ErrorStats, LogReporter,
};
pub use environment::{ClientEnvironment, Connectivity, ConnectivityFlag};
pub use errors::{
    classify_with_status, ClassifiedError, ErrorClassification, ErrorClassifier, ErrorKind,
    ResilienceError, Severity, UpstreamError,
};
pub use health::{Admission, HealthConfig, HealthReport, HealthState, ServiceHealthTracker};
pub use orchestrator::{
    CacheError, CatalogCache, CatalogProvider, DataSource, FallbackOrchestrator, FetchDiagnostics,
    FetchError, FetchOutcome, GeneratorError, PlaceholderCatalog,
};
pub use retry::{RetryExecutor, RetryPolicy};
pub use store::{KeyValueStore, MemoryStore, StoreError};
