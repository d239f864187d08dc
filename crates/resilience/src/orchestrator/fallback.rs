//! The fallback orchestrator.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::{
    CacheError, CatalogCache, CatalogProvider, FetchDiagnostics, GeneratorError,
    PlaceholderCatalog, SkipReason, Tier,
};
use crate::catalog::{CatalogPage, CatalogQuery};
use crate::diagnostics::ErrorLog;
use crate::errors::{ClassifiedError, ErrorKind};
use crate::health::{Admission, HealthReport, ServiceHealthTracker};
use crate::retry::{RetryExecutor, RetryPolicy};

/// Where the returned data came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Primary,
    Cache,
    Placeholder,
}

/// Successful result of [`FallbackOrchestrator::fetch_with_fallback`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub data: CatalogPage,
    pub source: DataSource,
    /// User-facing explanation when the data did not come from the provider.
    /// Always a classification message, never raw provider text.
    pub notice: Option<String>,
    pub diagnostics: FetchDiagnostics,
}

impl FetchOutcome {
    pub fn is_placeholder(&self) -> bool {
        self.source == DataSource::Placeholder
    }

    pub fn is_fallback(&self) -> bool {
        self.source != DataSource::Primary
    }
}

/// Raised only when every tier of the fallback chain failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("All catalog sources failed: {generator}")]
    Exhausted {
        /// Cache lookup failure, if the cache errored rather than missed.
        cache: Option<CacheError>,
        generator: GeneratorError,
        diagnostics: FetchDiagnostics,
    },
}

/// Composes health tracking, retries, the cache and the placeholder
/// generator into a single fetch that practically never fails.
///
/// Every collaborator is injected, so independent orchestrators (for
/// different providers, or in tests) can coexist.
pub struct FallbackOrchestrator {
    provider: Arc<dyn CatalogProvider>,
    cache: Arc<dyn CatalogCache>,
    placeholder: Arc<dyn PlaceholderCatalog>,
    executor: RetryExecutor,
    health: Arc<ServiceHealthTracker>,
    policy: RetryPolicy,
}

impl FallbackOrchestrator {
    /// Create an orchestrator using the default retry policy.
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        cache: Arc<dyn CatalogCache>,
        placeholder: Arc<dyn PlaceholderCatalog>,
        executor: RetryExecutor,
        health: Arc<ServiceHealthTracker>,
    ) -> Self {
        Self {
            provider,
            cache,
            placeholder,
            executor,
            health,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn health(&self) -> &Arc<ServiceHealthTracker> {
        &self.health
    }

    pub fn error_log(&self) -> &Arc<ErrorLog> {
        self.executor.error_log()
    }

    pub fn health_report(&self) -> HealthReport {
        self.health.health_report()
    }

    /// Fetch a catalog page, falling back to cache then placeholder data.
    pub async fn fetch_with_fallback(
        &self,
        query: &CatalogQuery,
    ) -> Result<FetchOutcome, FetchError> {
        let dependency = self.provider.id();
        let mut diagnostics = FetchDiagnostics::new();

        if !self.executor.classifier().is_online() {
            debug!("Host offline, skipping provider '{}'", dependency);
            diagnostics.record_skip(Tier::Primary, SkipReason::Offline);
            let notice = ErrorKind::NetworkOffline.user_message().to_string();
            return self.serve_fallback(query, Some(notice), diagnostics).await;
        }

        match self.health.admit(dependency) {
            Admission::Rejected => {
                debug!("Provider '{}' is degraded, skipping", dependency);
                diagnostics.record_skip(Tier::Primary, SkipReason::Degraded);
                let notice = self.degraded_notice(dependency);
                return self.serve_fallback(query, Some(notice), diagnostics).await;
            }
            Admission::Probe => info!("Probing degraded provider '{}'", dependency),
            Admission::Allowed => {}
        }

        let provider: &dyn CatalogProvider = self.provider.as_ref();
        let result = self
            .executor
            .with_retry(dependency, &self.policy, move || provider.search(query))
            .await;

        match result {
            Ok(page) => {
                self.health.record_success(dependency);
                diagnostics.record_success(Tier::Primary);

                if let Err(e) = self.cache.put(query, &page).await {
                    warn!("Failed to cache results for '{}': {}", query.query, e);
                }

                Ok(FetchOutcome {
                    data: page,
                    source: DataSource::Primary,
                    notice: None,
                    diagnostics,
                })
            }
            Err(error) => self.secondary_fallback(query, error, diagnostics).await,
        }
    }

    /// Handles an exhausted primary: health bookkeeping, then cache and
    /// placeholder tiers.
    async fn secondary_fallback(
        &self,
        query: &CatalogQuery,
        error: ClassifiedError,
        mut diagnostics: FetchDiagnostics,
    ) -> Result<FetchOutcome, FetchError> {
        let dependency = self.provider.id();
        diagnostics.record_error(Tier::Primary, error.to_string());

        self.health.record_failure(dependency, &error.error);

        let notice = error.classification.user_message;
        self.serve_fallback(query, Some(notice), diagnostics).await
    }

    /// User message for a skipped, degraded provider, derived from the
    /// failure that degraded it.
    fn degraded_notice(&self, dependency: &str) -> String {
        match self.health.snapshot(dependency).and_then(|s| s.last_error) {
            Some(error) => self.executor.classifier().classify(&error).user_message,
            None => ErrorKind::UnknownUpstream.user_message().to_string(),
        }
    }

    async fn serve_fallback(
        &self,
        query: &CatalogQuery,
        notice: Option<String>,
        mut diagnostics: FetchDiagnostics,
    ) -> Result<FetchOutcome, FetchError> {
        let cache_error = match self.cache.get(query).await {
            Ok(Some(page)) => {
                diagnostics.record_success(Tier::Cache);
                info!(
                    "Served '{}' from cache ({})",
                    query.query,
                    diagnostics.summary()
                );
                return Ok(FetchOutcome {
                    data: page,
                    source: DataSource::Cache,
                    notice,
                    diagnostics,
                });
            }
            Ok(None) => {
                diagnostics.record_miss(Tier::Cache);
                None
            }
            Err(e) => {
                warn!("Cache lookup failed for '{}': {}", query.query, e);
                diagnostics.record_error(Tier::Cache, e.to_string());
                Some(e)
            }
        };

        match self.placeholder.generate(query) {
            Ok(mut page) => {
                page.placeholder = true;
                diagnostics.record_success(Tier::Placeholder);
                info!(
                    "Served placeholder data for '{}' ({})",
                    query.query,
                    diagnostics.summary()
                );
                Ok(FetchOutcome {
                    data: page,
                    source: DataSource::Placeholder,
                    notice,
                    diagnostics,
                })
            }
            Err(generator) => {
                diagnostics.record_error(Tier::Placeholder, generator.to_string());
                error!(
                    "Every catalog source failed for '{}': {}",
                    query.query,
                    diagnostics.summary()
                );
                Err(FetchError::Exhausted {
                    cache: cache_error,
                    generator,
                    diagnostics,
                })
            }
        }
    }
}
