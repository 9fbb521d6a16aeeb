//! Enrichment: add runtime and credits to every discovered record.
//!
//! One pool task per record. A task only computes the enrichment for its
//! record; results are merged into the records once the whole batch has
//! finished, so a record is never shared between tasks and a failed or
//! timed-out task leaves its record exactly as discovery produced it.

use std::sync::Arc;

use marquee_core::{Enrichment, MovieRecord};
use marquee_lib::worker_pool::SAFETY_TIMEOUT;
use marquee_lib::{PoolError, WorkerPool};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::api::CatalogApi;
use crate::client::FetchClient;
use crate::error::FetchError;
use crate::events::IngestEvent;

/// Counters for one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub enriched: usize,
    pub skipped: usize,
}

pub struct EnrichmentPhase<C: FetchClient> {
    api: Arc<CatalogApi<C>>,
    workers: usize,
    item_timeout: Duration,
}

impl<C: FetchClient> EnrichmentPhase<C> {
    pub fn new(api: Arc<CatalogApi<C>>, workers: usize) -> Self {
        Self {
            api,
            workers,
            item_timeout: SAFETY_TIMEOUT,
        }
    }

    /// Time allowed for the requests of one record. A task may also wait out
    /// one batch pause and the task delay, which are added on top.
    pub fn item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = timeout;
        self
    }

    /// Enrich `records` in place. Per-record failures are absorbed; only a
    /// pool failure is returned.
    pub async fn run(
        &self,
        records: &mut [MovieRecord],
        events: &mpsc::UnboundedSender<IngestEvent>,
    ) -> Result<EnrichmentStats, FetchError> {
        if self.workers == 0 {
            return Err(PoolError::NoWorkers.into());
        }

        let _ = events.send(IngestEvent::EnrichmentStarted {
            total: records.len(),
        });
        if records.is_empty() {
            return Ok(EnrichmentStats::default());
        }

        self.api.throttle().reset_progress();

        let items: Vec<(usize, u64, String)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.external_id(), r.title.clone()))
            .collect();

        let cadence = self.api.throttle().config();
        let timeout = self.item_timeout + cadence.pause + cadence.task_delay;

        let api = self.api.clone();
        let tx = events.clone();
        let pool = WorkerPool::start_with_timeout(
            self.workers,
            items,
            timeout,
            move |(index, external_id, title)| {
                let api = api.clone();
                let events = tx.clone();
                async move {
                    let outcome = enrich_one(&api, external_id, &title, &events).await;
                    (index, outcome)
                }
            },
        )?;
        let results = pool.join().await?;

        let mut stats = EnrichmentStats::default();
        let mut finished = vec![false; records.len()];
        for (index, outcome) in results {
            finished[index] = true;
            match outcome {
                Some(enrichment) => {
                    records[index].apply_enrichment(enrichment);
                    stats.enriched += 1;
                }
                None => stats.skipped += 1,
            }
        }

        for (record, _) in records.iter().zip(&finished).filter(|(_, done)| !**done) {
            log::warn!(
                "Enrichment of {} \"{}\" timed out after {:?}",
                record.external_id(),
                record.title,
                timeout
            );
            let _ = events.send(IngestEvent::RecordSkipped {
                external_id: record.external_id(),
                title: record.title.clone(),
                reason: format!("timed out after {}s", timeout.as_secs()),
            });
            stats.skipped += 1;
        }
        Ok(stats)
    }
}

async fn enrich_one<C: FetchClient>(
    api: &CatalogApi<C>,
    external_id: u64,
    title: &str,
    events: &mpsc::UnboundedSender<IngestEvent>,
) -> Option<Enrichment> {
    let throttle = api.throttle();
    throttle.before_task().await;

    let outcome = match api.enrichment(external_id).await {
        Ok(enrichment) => {
            let _ = events.send(IngestEvent::RecordEnriched {
                external_id,
                title: title.to_string(),
            });
            Some(enrichment)
        }
        Err(e) => {
            log::warn!("Enrichment of {} \"{}\" skipped: {}", external_id, title, e);
            let _ = events.send(IngestEvent::RecordSkipped {
                external_id,
                title: title.to_string(),
                reason: e.to_string(),
            });
            None
        }
    };

    let completed = throttle.record_completion();
    if throttle.pause_due(completed) {
        let _ = events.send(IngestEvent::Pausing {
            completed,
            duration: throttle.config().pause,
        });
        // Later tasks wait at the gate; this one hands its result back now
        throttle.pause_batch();
    }
    outcome
}
