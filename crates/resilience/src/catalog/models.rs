//! Catalog request and response models.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// A catalog search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub query: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl CatalogQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            tags: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Stable cache key: normalized query text, page geometry and sorted tags.
    pub fn cache_key(&self) -> String {
        let normalized = self
            .query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();

        format!(
            "q={}|p={}|n={}|t={}",
            normalized,
            self.page,
            self.page_size,
            tags.join(",")
        )
    }
}

/// Metadata for a single sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleMetadata {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// One page of catalog results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub query: String,
    pub items: Vec<SampleMetadata>,
    #[serde(default)]
    pub total: u64,
    /// Set when the items are synthetic stand-ins rather than real results.
    #[serde(default)]
    pub placeholder: bool,
}

impl CatalogPage {
    pub fn new(query: impl Into<String>, items: Vec<SampleMetadata>) -> Self {
        let total = items.len() as u64;
        Self {
            query: query.into(),
            items,
            total,
            placeholder: false,
        }
    }
}
