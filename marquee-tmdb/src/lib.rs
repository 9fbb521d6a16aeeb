pub mod api;
pub mod client;
pub mod credentials;
pub mod detail;
pub mod discovery;
pub mod enrichment;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod ingest_log;
pub mod page;
pub mod query;
pub mod types;

pub use api::CatalogApi;
pub use client::{FetchClient, TmdbClient};
pub use credentials::{
    CredentialSource, CredentialSources, Credentials, config_path, credential_sources,
};
pub use discovery::{DiscoveryPhase, DiscoveryStats};
pub use enrichment::{EnrichmentPhase, EnrichmentStats};
pub use error::{FetchError, TransportCause};
pub use events::IngestEvent;
pub use fetcher::{FetchOptions, MovieFetcher, create_fetcher};
pub use ingest_log::{IngestLog, LogEntry, LogSummary};
pub use query::{DiscoveryQuery, Endpoints, redact_url};
