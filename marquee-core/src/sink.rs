//! Persistence seam.
//!
//! The pipeline only produces finished records; whoever stores them
//! implements [`RecordSink`].

use crate::record::MovieRecord;

/// Errors reported by a record sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink rejected records: {0}")]
    Rejected(String),
}

/// Receives completed records. Records handed over are never mutated again.
pub trait RecordSink {
    /// Accept a batch of finished records, returning how many were stored.
    fn accept(&mut self, records: &[MovieRecord]) -> Result<usize, SinkError>;
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<MovieRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MovieRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, records: &[MovieRecord]) -> Result<usize, SinkError> {
        self.records.extend_from_slice(records);
        Ok(records.len())
    }
}
