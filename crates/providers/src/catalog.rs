use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use stockwatch_core::config::CatalogConfig;
use stockwatch_core::domain::product::{find_in_listing, CatalogProduct};
use stockwatch_core::ports::CatalogClient;
use thiserror::Error;
use tracing::{debug, error};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("catalog api returned {0}")]
    Status(StatusCode),
    #[error("catalog response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the shop's "visible products" listing endpoint.
#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: Client,
    api_url: String,
    currency: String,
    page_size: u32,
    municipality: String,
    region: String,
}

impl HttpCatalogClient {
    pub fn from_config(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            currency: config.currency.clone(),
            page_size: config.page_size,
            municipality: config.municipality.clone(),
            region: config.region.clone(),
        })
    }

    fn request_body(&self) -> Value {
        json!({
            "filters": {
                "type": "TERM",
                "field": "rules.currencies",
                "value": self.currency,
                "objectId": false,
                "isDate": false
            },
            "size": self.page_size,
            "sort": { "order": "desc", "createdAt": "desc" }
        })
    }

    /// One page of the listing as raw entries; no pagination beyond the
    /// configured size. Only the top-level array shape is enforced.
    pub async fn fetch_listing(&self) -> Result<Vec<Value>, CatalogError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("dfl-shop-municipality", &self.municipality)
            .header("dfl-shop-region", &self.region)
            .json(&self.request_body())
            .send()
            .await
            .map_err(CatalogError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        response.json::<Vec<Value>>().await.map_err(CatalogError::Decode)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn find_product(&self, name: &str) -> Option<CatalogProduct> {
        match self.fetch_listing().await {
            Ok(entries) => {
                let found = find_in_listing(&entries, name);
                if found.is_none() {
                    debug!(
                        event_name = "catalog.fetch.no_match",
                        product = %name,
                        listed = entries.len(),
                        "product not present in catalog page"
                    );
                }
                found
            }
            Err(error @ CatalogError::Decode(_)) => {
                error!(
                    event_name = "catalog.fetch.decode_failed",
                    error = %error,
                    "error parsing products api response"
                );
                None
            }
            Err(error) => {
                error!(
                    event_name = "catalog.fetch.request_failed",
                    error = %error,
                    "error calling products api"
                );
                None
            }
        }
    }
}
