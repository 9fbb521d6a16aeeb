use std::path::Path;

use crate::events::IngestEvent;

/// A single noteworthy entry in the ingest log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    PageSkipped {
        year: i32,
        page: u32,
        reason: String,
    },
    YearCompleted {
        year: i32,
        records: usize,
    },
    RecordSkipped {
        external_id: u64,
        title: String,
        reason: String,
    },
}

/// Collects run events and writes a log file.
#[derive(Debug, Default)]
pub struct IngestLog {
    entries: Vec<LogEntry>,
    pages_fetched: usize,
    records_discovered: usize,
    records_enriched: usize,
}

impl IngestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Fold one progress event into the log.
    pub fn record_event(&mut self, event: &IngestEvent) {
        match event {
            IngestEvent::PageFetched { .. } => self.pages_fetched += 1,
            IngestEvent::PageSkipped { year, page, reason } => self.add(LogEntry::PageSkipped {
                year: *year,
                page: *page,
                reason: reason.clone(),
            }),
            IngestEvent::YearCompleted { year, records } => self.add(LogEntry::YearCompleted {
                year: *year,
                records: *records,
            }),
            IngestEvent::DiscoveryComplete { total } => self.records_discovered = *total,
            IngestEvent::RecordEnriched { .. } => self.records_enriched += 1,
            IngestEvent::RecordSkipped {
                external_id,
                title,
                reason,
            } => self.add(LogEntry::RecordSkipped {
                external_id: *external_id,
                title: title.clone(),
                reason: reason.clone(),
            }),
            _ => {}
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary {
            pages_fetched: self.pages_fetched,
            records_discovered: self.records_discovered,
            records_enriched: self.records_enriched,
            ..LogSummary::default()
        };
        for entry in &self.entries {
            match entry {
                LogEntry::PageSkipped { .. } => summary.pages_skipped += 1,
                LogEntry::YearCompleted { .. } => summary.years += 1,
                LogEntry::RecordSkipped { .. } => summary.records_skipped += 1,
            }
        }
        summary
    }

    /// Write the log to a file.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)?;
        let summary = self.summary();

        writeln!(file, "=== Ingest Log ===")?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(file, "Years: {}", summary.years)?;
        writeln!(
            file,
            "Pages: {} fetched, {} skipped",
            summary.pages_fetched, summary.pages_skipped
        )?;
        writeln!(file, "Records discovered: {}", summary.records_discovered)?;
        writeln!(
            file,
            "Records enriched: {} ({} skipped)",
            summary.records_enriched, summary.records_skipped
        )?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                LogEntry::PageSkipped { year, page, reason } => {
                    writeln!(file, "[PAGE SKIPPED] {} page {}: {}", year, page, reason)?;
                }
                LogEntry::YearCompleted { year, records } => {
                    writeln!(file, "[YEAR] {}: {} records", year, records)?;
                }
                LogEntry::RecordSkipped {
                    external_id,
                    title,
                    reason,
                } => {
                    writeln!(
                        file,
                        "[NOT ENRICHED] {} \"{}\": {}",
                        external_id, title, reason
                    )?;
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub years: usize,
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    pub records_discovered: usize,
    pub records_enriched: usize,
    pub records_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> IngestLog {
        let mut log = IngestLog::new();
        for event in [
            IngestEvent::PageFetched {
                year: 2000,
                page: 1,
                records: 20,
            },
            IngestEvent::PageSkipped {
                year: 2000,
                page: 2,
                reason: "HTTP 503".into(),
            },
            IngestEvent::YearCompleted {
                year: 2000,
                records: 20,
            },
            IngestEvent::DiscoveryComplete { total: 20 },
            IngestEvent::RecordEnriched {
                external_id: 10,
                title: "Heat".into(),
            },
            IngestEvent::RecordSkipped {
                external_id: 20,
                title: "Ronin".into(),
                reason: "timed out".into(),
            },
            IngestEvent::Done { total: 20 },
        ] {
            log.record_event(&event);
        }
        log
    }

    #[test]
    fn summary_counts_events() {
        let log = sample_log();
        assert_eq!(
            log.summary(),
            LogSummary {
                years: 1,
                pages_fetched: 1,
                pages_skipped: 1,
                records_discovered: 20,
                records_enriched: 1,
                records_skipped: 1,
            }
        );
        assert_eq!(log.entries().len(), 3);
    }

    #[test]
    fn progress_only_events_add_no_entries() {
        let mut log = IngestLog::new();
        log.record_event(&IngestEvent::EnrichmentStarted { total: 5 });
        log.record_event(&IngestEvent::Cooldown {
            duration: std::time::Duration::from_secs(1),
        });
        assert!(log.entries().is_empty());
        assert_eq!(log.summary(), LogSummary::default());
    }

    #[test]
    fn write_to_file_lists_skips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.log");

        sample_log().write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.starts_with("=== Ingest Log ==="));
        assert!(text.contains("Pages: 1 fetched, 1 skipped"));
        assert!(text.contains("[PAGE SKIPPED] 2000 page 2: HTTP 503"));
        assert!(text.contains("[NOT ENRICHED] 20 \"Ronin\": timed out"));
    }
}
