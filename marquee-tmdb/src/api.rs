//! Typed access to the three catalog endpoints.
//!
//! The shared throttle is handed to the client with every call so that
//! each upstream request, retries included, takes a token.

use std::sync::Arc;

use marquee_core::Enrichment;
use marquee_lib::Throttle;
use reqwest::Url;

use crate::client::FetchClient;
use crate::detail::parse_enrichment;
use crate::error::FetchError;
use crate::page::{Page, parse_page};
use crate::query::{DiscoveryQuery, Endpoints};
use crate::types::ErrorPayload;

pub struct CatalogApi<C: FetchClient> {
    client: Arc<C>,
    endpoints: Endpoints,
    throttle: Throttle,
}

impl<C: FetchClient> CatalogApi<C> {
    pub fn new(client: Arc<C>, endpoints: Endpoints, throttle: Throttle) -> Self {
        Self {
            client,
            endpoints,
            throttle,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    async fn get(&self, url: Url) -> Result<String, FetchError> {
        self.client.fetch(url.as_str(), &self.throttle).await
    }

    /// One call to `/configuration`. Fails on transport errors, error
    /// payloads and non-JSON bodies.
    pub async fn check_configuration(&self) -> Result<(), FetchError> {
        let body = self.get(self.endpoints.configuration_url()).await?;
        if let Some(err) = ErrorPayload::detect(&body) {
            return Err(FetchError::Application {
                code: err.code(),
                message: err.message().to_string(),
            });
        }
        serde_json::from_str::<serde_json::Value>(&body)
            .map_err(|e| FetchError::malformed("configuration", e))?;
        Ok(())
    }

    pub async fn discover_page(
        &self,
        query: &DiscoveryQuery,
        year: i32,
        page: u32,
    ) -> Result<Page, FetchError> {
        let body = self
            .get(self.endpoints.discover_url(query, year, page))
            .await?;
        parse_page(&body)
    }

    /// Detail then credits for one movie, combined.
    pub async fn enrichment(&self, external_id: u64) -> Result<Enrichment, FetchError> {
        let detail = self.get(self.endpoints.detail_url(external_id)).await?;
        let credits = self.get(self.endpoints.credits_url(external_id)).await?;
        parse_enrichment(external_id, &detail, &credits)
    }
}
