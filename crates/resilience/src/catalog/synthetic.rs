//! Synthetic placeholder catalog.
//!
//! Last tier of the fallback chain. Produces well-formed, clearly-marked
//! placeholder pages so the UI always has something to render.

use crate::catalog::{CatalogPage, CatalogQuery, SampleMetadata};
use crate::orchestrator::{GeneratorError, PlaceholderCatalog};

const PLACEHOLDER_ARTIST: &str = "SampleHub";
const PLACEHOLDER_DURATION_MS: u64 = 8_000;
const PLACEHOLDER_BPMS: &[u32] = &[80, 90, 100, 120, 128, 140, 160, 174];
const PLACEHOLDER_KEYS: &[&str] = &["C", "Dm", "Eb", "F", "G", "Am", "Bb"];

/// Deterministic placeholder generator.
#[derive(Clone, Debug)]
pub struct SyntheticCatalog {
    max_items: u32,
}

impl SyntheticCatalog {
    pub fn new() -> Self {
        Self { max_items: 12 }
    }

    pub fn with_max_items(max_items: u32) -> Self {
        Self { max_items }
    }
}

impl Default for SyntheticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderCatalog for SyntheticCatalog {
    fn generate(&self, query: &CatalogQuery) -> Result<CatalogPage, GeneratorError> {
        let count = query.page_size.min(self.max_items);
        let offset = query.page.saturating_mul(query.page_size);
        let label = match query.query.trim() {
            "" => "Sample".to_string(),
            q => q.to_string(),
        };

        let items = (0..count)
            .map(|i| {
                let n = offset.saturating_add(i) as usize;
                SampleMetadata {
                    id: format!("placeholder-{}", n),
                    title: format!("{} #{}", label, n + 1),
                    artist: PLACEHOLDER_ARTIST.to_string(),
                    duration_ms: PLACEHOLDER_DURATION_MS,
                    bpm: Some(PLACEHOLDER_BPMS[n % PLACEHOLDER_BPMS.len()]),
                    key: Some(PLACEHOLDER_KEYS[n % PLACEHOLDER_KEYS.len()].to_string()),
                    tags: query.tags.clone(),
                    preview_url: None,
                    thumbnail_url: None,
                }
            })
            .collect();

        let mut page = CatalogPage::new(query.query.clone(), items);
        page.placeholder = true;
        Ok(page)
    }
}
