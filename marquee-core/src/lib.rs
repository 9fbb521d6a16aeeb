//! Shared data model for the marquee ingestion pipeline.
//!
//! Everything here is plain data: the movie record that flows through the
//! pipeline, the genre lookup used to name genre codes, and the seam through
//! which finished records are handed to persistence.

pub mod genre;
pub mod record;
pub mod sink;

pub use genre::{GenreCatalog, UNKNOWN_GENRE};
pub use record::{Enrichment, MovieRecord, PersonRef};
pub use sink::{MemorySink, RecordSink, SinkError};
