//! HTTP adapter for the remote sample catalog.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use samplehub_resilience::{CatalogPage, CatalogProvider, CatalogQuery, SampleMetadata, UpstreamError};

const PROVIDER_ID: &str = "catalog-api";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    items: Vec<SampleMetadata>,
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

/// Accepts both `{"error": "text"}` and `{"error": {"message": "text"}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Message(String),
    Detailed { message: String },
}

impl ErrorBody {
    fn into_message(self) -> String {
        match self {
            Self::Message(message) | Self::Detailed { message } => message,
        }
    }
}

/// Searches the catalog over HTTP and reports failures as [`UpstreamError`]s.
pub struct HttpCatalogProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalogProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("samplehub/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

/// Build an [`UpstreamError`] from a non-success response.
fn error_from_response(status: u16, body: &str) -> UpstreamError {
    if let Ok(ErrorResponse { error: Some(error) }) = serde_json::from_str::<ErrorResponse>(body) {
        return UpstreamError::http(status, error.into_message());
    }
    UpstreamError::http(status, format!("HTTP {} - {}", status, body.trim()))
}

fn parse_page(query: &CatalogQuery, body: &str) -> Result<CatalogPage, UpstreamError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamError::new(format!("Failed to decode search response: {}", e)))?;

    let mut page = CatalogPage::new(query.query.clone(), response.items);
    if let Some(total) = response.total {
        page.total = total;
    }
    Ok(page)
}

impl HttpCatalogProvider {
    async fn execute(&self, query: &CatalogQuery) -> Result<CatalogPage, UpstreamError> {
        let page = query.page.to_string();
        let page_size = query.page_size.to_string();
        let tags = query.tags.join(",");

        let mut request = self.client.get(self.search_url()).query(&[
            ("q", query.query.as_str()),
            ("page", page.as_str()),
            ("pageSize", page_size.as_str()),
        ]);
        if !tags.is_empty() {
            request = request.query(&[("tags", tags.as_str())]);
        }

        debug!("Catalog request: '{}' page {}", query.query, query.page);

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &body));
        }

        parse_page(query, &body)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    /// Bounded by the configured timeout; an expired deadline surfaces as a
    /// timeout-shaped [`UpstreamError`].
    async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage, UpstreamError> {
        tokio::time::timeout(self.timeout, self.execute(query))
            .await
            .map_err(|_| UpstreamError::timeout("catalog search", self.timeout))?
    }
}
