use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use samplehub_resilience::{
    ClientEnvironment, ConnectivityFlag, ErrorClassifier, ErrorLog, FallbackOrchestrator,
    LogReporter, RetryExecutor, ServiceHealthTracker, StoreCatalogCache, SyntheticCatalog,
};
use samplehub_storage_sqlite::SqliteStore;

use crate::config::Config;
use crate::provider::HttpCatalogProvider;

/// Cached pages older than this are ignored.
const CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub struct AppState {
    pub orchestrator: FallbackOrchestrator,
    pub store: Arc<SqliteStore>,
}

/// Shape of the diagnostic lines written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for log shippers
    Json,
}

/// Default directives when `RUST_LOG` is unset: our crates at `info`,
/// dependencies (reqwest, rusqlite) at `warn`.
const DEFAULT_DIRECTIVES: &str = "warn,samplehub=info,samplehub_resilience=info,samplehub_storage_sqlite=info";

/// Installs the global subscriber. Library crates log through `log`, which
/// the subscriber picks up via its `tracing-log` bridge.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // stdout carries the JSON command output, so events go to stderr.
    let events = match format {
        LogFormat::Text => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(events).with(filter).init();
}

pub fn build_state(config: &Config, offline: bool) -> anyhow::Result<AppState> {
    config.resilience.validate()?;

    let store = Arc::new(SqliteStore::open(Path::new(&config.db_path))?);
    tracing::info!("Database path in use: {}", config.db_path);

    let connectivity = Arc::new(ConnectivityFlag::new(!offline));
    let environment = ClientEnvironment::new(
        config.provider_url.clone(),
        ClientEnvironment::default().user_agent,
    );

    let error_log = ErrorLog::with_config(
        store.clone(),
        connectivity.clone(),
        environment,
        config.resilience.error_log.clone(),
    )
    .with_reporter(Arc::new(LogReporter));

    let executor = RetryExecutor::new(
        Arc::new(ErrorClassifier::new(connectivity.clone())),
        Arc::new(error_log),
    );
    let health = Arc::new(ServiceHealthTracker::with_config(
        config.resilience.health.clone(),
    ));

    let orchestrator = FallbackOrchestrator::new(
        Arc::new(HttpCatalogProvider::new(
            config.provider_url.clone(),
            config.request_timeout,
        )),
        Arc::new(StoreCatalogCache::new(store.clone()).with_ttl(CACHE_TTL)),
        Arc::new(SyntheticCatalog::new()),
        executor,
        health,
    )
    .with_policy(config.resilience.retry.clone());

    Ok(AppState {
        orchestrator,
        store,
    })
}
