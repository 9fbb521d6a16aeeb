//! Discovery: enumerate candidate movies year by year.
//!
//! Years run one after another. Within a year, page 1 is fetched first to
//! learn whether the year has results and, when reported, how many pages.
//! The remaining pages are submitted to the worker pool together and
//! awaited as a batch. Without a page count every page up to the cap is
//! submitted; pages past the end simply come back empty.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::Arc;

use marquee_core::MovieRecord;
use marquee_lib::worker_pool::SAFETY_TIMEOUT;
use marquee_lib::{PoolError, WorkerPool};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::api::CatalogApi;
use crate::client::FetchClient;
use crate::error::FetchError;
use crate::events::IngestEvent;
use crate::page::Page;
use crate::query::DiscoveryQuery;

/// Upstream refuses pages past this.
pub const MAX_PAGES: u32 = 500;

/// Counters for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    pub years: usize,
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    /// Records dropped because their id was already discovered.
    pub duplicates: usize,
    pub records: usize,
}

pub struct DiscoveryPhase<C: FetchClient> {
    api: Arc<CatalogApi<C>>,
    query: Arc<DiscoveryQuery>,
    workers: usize,
    max_pages: u32,
    use_total_pages: bool,
    item_timeout: Duration,
}

impl<C: FetchClient> DiscoveryPhase<C> {
    pub fn new(
        api: Arc<CatalogApi<C>>,
        query: DiscoveryQuery,
        workers: usize,
        max_pages: u32,
    ) -> Self {
        Self {
            api,
            query: Arc::new(query),
            workers,
            max_pages: max_pages.clamp(1, MAX_PAGES),
            use_total_pages: true,
            item_timeout: SAFETY_TIMEOUT,
        }
    }

    /// Time allowed for one pooled page before it is given up on.
    pub fn item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = timeout;
        self
    }

    /// Trust `total_pages` from page 1 to bound the year (default on).
    pub fn use_total_pages(mut self, enabled: bool) -> Self {
        self.use_total_pages = enabled;
        self
    }

    /// Discover every year in `years`, returning unique records.
    ///
    /// Page failures are logged and skipped. Only pool failures abort.
    pub async fn run(
        &self,
        years: RangeInclusive<i32>,
        events: &mpsc::UnboundedSender<IngestEvent>,
    ) -> Result<(Vec<MovieRecord>, DiscoveryStats), FetchError> {
        if self.workers == 0 {
            return Err(PoolError::NoWorkers.into());
        }

        let _ = events.send(IngestEvent::DiscoveryStarted {
            first_year: *years.start(),
            last_year: *years.end(),
        });

        let mut records: Vec<MovieRecord> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut stats = DiscoveryStats::default();

        for year in years {
            let pages = self.fetch_year(year, events, &mut stats).await?;
            stats.years += 1;

            let before = records.len();
            for record in pages.into_iter().flat_map(|p| p.records) {
                if seen.insert(record.external_id()) {
                    records.push(record);
                } else {
                    stats.duplicates += 1;
                }
            }

            let added = records.len() - before;
            log::debug!("Discovery {}: {} new records", year, added);
            let _ = events.send(IngestEvent::YearCompleted {
                year,
                records: added,
            });
        }

        stats.records = records.len();
        let _ = events.send(IngestEvent::DiscoveryComplete {
            total: records.len(),
        });
        Ok((records, stats))
    }

    /// Fetch all pages of one year, in page order. Failed pages are absent.
    async fn fetch_year(
        &self,
        year: i32,
        events: &mpsc::UnboundedSender<IngestEvent>,
        stats: &mut DiscoveryStats,
    ) -> Result<Vec<Page>, FetchError> {
        let first = self.api.discover_page(&self.query, year, 1).await;
        let last_page = match &first {
            Ok(page) if page.is_empty() => 1,
            Ok(page) => page
                .total_pages
                .filter(|_| self.use_total_pages)
                .map_or(self.max_pages, |total| total.clamp(1, self.max_pages)),
            Err(_) => self.max_pages,
        };

        let _ = events.send(IngestEvent::YearStarted {
            year,
            pages: last_page,
        });

        let mut pages = Vec::new();
        pages.extend(absorb(year, 1, first, stats, events)?);
        if last_page < 2 {
            return Ok(pages);
        }

        let api = self.api.clone();
        let query = self.query.clone();
        let pool = WorkerPool::start_with_timeout(
            self.workers,
            (2..=last_page).collect(),
            self.item_timeout,
            move |page| {
                let api = api.clone();
                let query = query.clone();
                async move {
                    let result = api.discover_page(&query, year, page).await;
                    (page, result)
                }
            },
        )?;

        let mut outcomes = pool.join().await?;
        outcomes.sort_by_key(|(page, _)| *page);

        let returned: HashSet<u32> = outcomes.iter().map(|(page, _)| *page).collect();
        for page in (2..=last_page).filter(|p| !returned.contains(p)) {
            stats.pages_skipped += 1;
            log::warn!("Discovery {} page {}: timed out", year, page);
            let _ = events.send(IngestEvent::PageSkipped {
                year,
                page,
                reason: format!("timed out after {}s", self.item_timeout.as_secs()),
            });
        }

        for (page, result) in outcomes {
            pages.extend(absorb(year, page, result, stats, events)?);
        }
        Ok(pages)
    }
}

/// Turn one page outcome into a page or a logged skip. Fatal errors pass
/// through.
fn absorb(
    year: i32,
    page: u32,
    result: Result<Page, FetchError>,
    stats: &mut DiscoveryStats,
    events: &mpsc::UnboundedSender<IngestEvent>,
) -> Result<Option<Page>, FetchError> {
    match result {
        Ok(p) => {
            stats.pages_fetched += 1;
            let _ = events.send(IngestEvent::PageFetched {
                year,
                page,
                records: p.records.len(),
            });
            Ok(Some(p))
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            stats.pages_skipped += 1;
            log::warn!("Discovery {} page {}: skipping ({})", year, page, e);
            let _ = events.send(IngestEvent::PageSkipped {
                year,
                page,
                reason: e.to_string(),
            });
            Ok(None)
        }
    }
}
