use std::future::Future;

use marquee_lib::{IngestSettings, Throttle};
use tokio::time::Duration;

use crate::error::{FetchError, TransportCause};
use crate::query::redact_url;
use crate::types::ErrorPayload;

/// Something that can GET a URL and hand back the body text.
///
/// The pipeline is generic over this so tests can substitute canned
/// responses for the network. Every request sent upstream, a retry
/// included, first waits on `throttle`.
pub trait FetchClient: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        throttle: &Throttle,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP client for the TMDB API.
///
/// A failed exchange (I/O error or non-2xx status) is retried exactly once
/// after a fixed delay. A 2xx body carrying an error payload is returned
/// as-is; detecting it is up to the parser.
pub struct TmdbClient {
    http: reqwest::Client,
    retry_delay: Duration,
}

impl TmdbClient {
    pub fn new(timeout: Duration, retry_delay: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, retry_delay })
    }

    pub fn from_settings(settings: &IngestSettings) -> Result<Self, FetchError> {
        Self::new(settings.request_timeout(), settings.retry_delay())
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    async fn get_once(&self, url: &str) -> Result<String, TransportCause> {
        // reqwest errors carry the full URL, api key included
        let resp = self.http.get(url).send().await.map_err(strip_url)?;
        let status = resp.status();
        let text = resp.text().await.map_err(strip_url)?;

        if !status.is_success() {
            let message = ErrorPayload::detect(&text).map(|p| p.message().to_string());
            return Err(TransportCause::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }
}

impl FetchClient for TmdbClient {
    async fn fetch(&self, url: &str, throttle: &Throttle) -> Result<String, FetchError> {
        throttle.acquire().await;
        match self.get_once(url).await {
            Ok(body) => Ok(body),
            Err(first) => {
                log::debug!(
                    "GET {} failed ({}), retrying in {}ms",
                    redact_url(url),
                    first,
                    self.retry_delay.as_millis()
                );
                tokio::time::sleep(self.retry_delay).await;
                throttle.acquire().await;
                self.get_once(url)
                    .await
                    .map_err(|cause| FetchError::transport(redact_url(url), cause))
            }
        }
    }
}

fn strip_url(e: reqwest::Error) -> TransportCause {
    TransportCause::Http(e.without_url())
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
