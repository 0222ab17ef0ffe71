//! HTTP client for the product and party search collaborators.

use crate::config::CatalogConfig;
use crate::models::{PartyKind, PartyRecord, ProductRecord};
use crate::services::metrics;
use reqwest::Client;
use serde::de::DeserializeOwned;
use service_core::observability::TracedClientExt;
use thiserror::Error;

/// Party queries shorter than this are answered locally with no results.
pub const MIN_PARTY_QUERY_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog base URL is not configured")]
    NotConfigured,

    #[error("catalog request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("catalog responded with status {0}")]
    Status(u16),

    #[error("catalog response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.base_url.trim().is_empty()
    }

    /// `GET {base}{product_search_path}?q=<query>`
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        let result = self
            .fetch(&self.config.product_search_path, &[("q", query)])
            .await;
        metrics::record_catalog_request("products", &result);
        result
    }

    /// `GET {base}{party_search_path}?q=<query>&type=<kind>`
    pub async fn search_parties(
        &self,
        query: &str,
        kind: PartyKind,
    ) -> Result<Vec<PartyRecord>, CatalogError> {
        if query.trim().chars().count() < MIN_PARTY_QUERY_LEN {
            return Ok(Vec::new());
        }

        let result = self
            .fetch(
                &self.config.party_search_path,
                &[("q", query), ("type", kind.as_str())],
            )
            .await;
        metrics::record_catalog_request("parties", &result);
        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, CatalogError> {
        if !self.is_configured() {
            return Err(CatalogError::NotConfigured);
        }

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!(url = %url, "Querying catalog");

        let response = self
            .client
            .traced_get(&url)
            .query(query)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(CatalogError::Request)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Catalog search failed");
            return Err(CatalogError::Status(status.as_u16()));
        }

        response.json::<Vec<T>>().await.map_err(CatalogError::Decode)
    }
}
