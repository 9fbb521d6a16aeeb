use tokio::time::Duration;

/// Progress events emitted during an ingestion run, consumed by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    /// Discovery is starting over an inclusive year range.
    DiscoveryStarted { first_year: i32, last_year: i32 },
    /// Pages for a year have been queued.
    YearStarted { year: i32, pages: u32 },
    /// A page was fetched and parsed.
    PageFetched { year: i32, page: u32, records: usize },
    /// A page failed permanently and contributes nothing (non-fatal).
    PageSkipped { year: i32, page: u32, reason: String },
    /// All pages of a year are in; `records` counts new, unique records.
    YearCompleted { year: i32, records: usize },
    /// Discovery finished with this many unique records.
    DiscoveryComplete { total: usize },
    /// Waiting between discovery and enrichment.
    Cooldown { duration: Duration },
    /// Enrichment is starting.
    EnrichmentStarted { total: usize },
    /// A record got its runtime and credits.
    RecordEnriched { external_id: u64, title: String },
    /// A record kept its discovery fields only (non-fatal).
    RecordSkipped {
        external_id: u64,
        title: String,
        reason: String,
    },
    /// The batch is pausing after `completed` tasks.
    Pausing { completed: usize, duration: Duration },
    /// Run finished.
    Done { total: usize },
}
