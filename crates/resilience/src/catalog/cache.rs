//! Catalog cache backed by a [`KeyValueStore`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogPage, CatalogQuery};
use crate::orchestrator::{CacheError, CatalogCache};
use crate::store::KeyValueStore;

/// Key prefix for cached pages.
pub const DEFAULT_CACHE_PREFIX: &str = "samplehub.catalog";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedPage {
    stored_at: i64,
    page: CatalogPage,
}

/// Stores one JSON entry per [`CatalogQuery::cache_key`].
///
/// Entries older than the optional TTL are treated as misses. Expired
/// entries are left in place and overwritten by the next successful fetch.
pub struct StoreCatalogCache {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    ttl: Option<Duration>,
}

impl StoreCatalogCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key_for(&self, query: &CatalogQuery) -> String {
        format!("{}:{}", self.prefix, query.cache_key())
    }

    fn is_expired(&self, stored_at: i64) -> bool {
        match self.ttl {
            Some(ttl) => {
                let age_ms = Utc::now().timestamp_millis().saturating_sub(stored_at);
                age_ms > i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogCache for StoreCatalogCache {
    async fn get(&self, query: &CatalogQuery) -> Result<Option<CatalogPage>, CacheError> {
        let key = self.key_for(query);
        let Some(payload) = self.store.get(&key)? else {
            return Ok(None);
        };

        let entry: CachedPage =
            serde_json::from_str(&payload).map_err(|e| CacheError::Corrupt(e.to_string()))?;

        if self.is_expired(entry.stored_at) {
            debug!("Cache entry '{}' expired", key);
            return Ok(None);
        }

        Ok(Some(entry.page))
    }

    async fn put(&self, query: &CatalogQuery, page: &CatalogPage) -> Result<(), CacheError> {
        let entry = CachedPage {
            stored_at: Utc::now().timestamp_millis(),
            page: page.clone(),
        };
        let payload =
            serde_json::to_string(&entry).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        self.store.set(&self.key_for(query), &payload)?;
        Ok(())
    }
}
