//! The two-phase ingestion run: discovery, a cooldown, then enrichment.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use marquee_core::{GenreCatalog, MovieRecord};
use marquee_lib::{IngestSettings, PoolError, Settings, Throttle, ThrottleConfig};
use tokio::sync::mpsc;

use crate::api::CatalogApi;
use crate::client::{FetchClient, TmdbClient};
use crate::credentials::Credentials;
use crate::discovery::DiscoveryPhase;
use crate::enrichment::EnrichmentPhase;
use crate::error::FetchError;
use crate::events::IngestEvent;
use crate::query::{DiscoveryQuery, Endpoints};

/// Knobs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Pool size, shared by both phases.
    pub workers: usize,
    pub max_pages: u32,
    pub first_year: i32,
    pub last_year: i32,
    pub cooldown: Duration,
    pub use_total_pages: bool,
    /// Probe `/configuration` before discovery.
    pub sanity_check: bool,
    /// Per pool item; enrichment adds the batch pause on top.
    pub item_timeout: Duration,
}

impl FetchOptions {
    pub fn from_settings(settings: &IngestSettings, current_year: i32) -> Self {
        let (first_year, last_year) = settings.year_range(current_year);
        Self {
            workers: settings.workers,
            max_pages: settings.max_pages,
            first_year,
            last_year,
            cooldown: settings.cooldown(),
            use_total_pages: settings.use_total_pages,
            sanity_check: true,
            item_timeout: settings.item_timeout(),
        }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_settings(&IngestSettings::default(), chrono::Local::now().year())
    }
}

pub struct MovieFetcher<C: FetchClient> {
    api: Arc<CatalogApi<C>>,
    query: DiscoveryQuery,
    catalog: GenreCatalog,
    options: FetchOptions,
}

impl<C: FetchClient> MovieFetcher<C> {
    pub fn new(client: Arc<C>, endpoints: Endpoints, throttle: ThrottleConfig) -> Self {
        Self {
            api: Arc::new(CatalogApi::new(client, endpoints, Throttle::new(throttle))),
            query: DiscoveryQuery::default(),
            catalog: GenreCatalog::default(),
            options: FetchOptions::default(),
        }
    }

    pub fn with_query(mut self, query: DiscoveryQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_catalog(mut self, catalog: GenreCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Run both phases and return the translated records.
    pub async fn fetch_movies(&self) -> Result<Vec<MovieRecord>, FetchError> {
        let (tx, _rx) = mpsc::unbounded_channel();
        self.fetch_movies_with_events(tx).await
    }

    /// Same as [`fetch_movies`](Self::fetch_movies), reporting progress on
    /// `events`. Sends are best-effort; a dropped receiver is ignored.
    pub async fn fetch_movies_with_events(
        &self,
        events: mpsc::UnboundedSender<IngestEvent>,
    ) -> Result<Vec<MovieRecord>, FetchError> {
        let opts = &self.options;
        if opts.workers == 0 {
            return Err(PoolError::NoWorkers.into());
        }
        if opts.first_year > opts.last_year {
            return Err(FetchError::config(format!(
                "first year {} is after last year {}",
                opts.first_year, opts.last_year
            )));
        }

        if opts.sanity_check {
            self.api.check_configuration().await.inspect_err(|e| {
                log::error!("Catalog API is not usable: {}", e);
            })?;
            log::debug!("Configuration check passed for {}", self.api.endpoints().base_url());
        }

        let discovery = DiscoveryPhase::new(
            self.api.clone(),
            self.query.clone(),
            opts.workers,
            opts.max_pages,
        )
        .use_total_pages(opts.use_total_pages)
        .item_timeout(opts.item_timeout);
        let (mut records, stats) = discovery.run(opts.years(), &events).await?;
        log::info!(
            "Discovered {} records in {} years ({} pages, {} skipped, {} duplicates)",
            stats.records,
            stats.years,
            stats.pages_fetched,
            stats.pages_skipped,
            stats.duplicates
        );

        if !records.is_empty() && !opts.cooldown.is_zero() {
            let _ = events.send(IngestEvent::Cooldown {
                duration: opts.cooldown,
            });
            log::info!("Cooling down for {:?} before enrichment", opts.cooldown);
            tokio::time::sleep(opts.cooldown).await;
        }

        let stats = EnrichmentPhase::new(self.api.clone(), opts.workers)
            .item_timeout(opts.item_timeout)
            .run(&mut records, &events)
            .await?;
        log::info!(
            "Enriched {} records ({} kept discovery fields only)",
            stats.enriched,
            stats.skipped
        );

        for record in &mut records {
            record.translate_genres(&self.catalog);
        }

        let _ = events.send(IngestEvent::Done {
            total: records.len(),
        });
        Ok(records)
    }
}

/// Build a fetcher over the real HTTP client from settings and credentials.
pub fn create_fetcher(
    settings: &Settings,
    credentials: &Credentials,
    current_year: i32,
) -> Result<MovieFetcher<TmdbClient>, FetchError> {
    let client = Arc::new(TmdbClient::from_settings(&settings.ingest)?);
    let endpoints = Endpoints::new(&credentials.base_url, credentials.api_key.clone())?;
    Ok(
        MovieFetcher::new(client, endpoints, settings.ingest.throttle_config())
            .with_query(DiscoveryQuery::from(&settings.query))
            .with_options(FetchOptions::from_settings(&settings.ingest, current_year)),
    )
}
