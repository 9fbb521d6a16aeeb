//! Terminal progress for an ingestion run.
//!
//! Discovery shows one bar over the year range; enrichment shows one bar
//! over the discovered records. Hidden entirely in quiet mode.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use marquee_tmdb::IngestEvent;

const TICK: Duration = Duration::from_millis(100);

pub(crate) struct IngestProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl IngestProgress {
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            quiet,
        }
    }

    fn replace(&mut self, len: Option<u64>, template: &str) {
        self.bar.finish_and_clear();
        if self.quiet {
            return;
        }
        let bar = match len {
            Some(n) => ProgressBar::new(n),
            None => ProgressBar::new_spinner(),
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
            .tick_chars("/-\\|");
        bar.set_style(style);
        bar.enable_steady_tick(TICK);
        self.bar = bar;
    }

    pub(crate) fn handle(&mut self, event: &IngestEvent) {
        match *event {
            IngestEvent::DiscoveryStarted {
                first_year,
                last_year,
            } => {
                let years = (last_year - first_year + 1).max(0) as u64;
                self.replace(
                    Some(years),
                    "  {spinner:.cyan} Discovering [{bar:30.cyan/blue}] {pos}/{len} years {msg}",
                );
            }
            IngestEvent::YearStarted { year, pages } => {
                self.bar.set_message(format!("({year}, {pages} pages)"));
            }
            IngestEvent::YearCompleted { .. } => self.bar.inc(1),
            IngestEvent::DiscoveryComplete { .. } => self.bar.finish_and_clear(),
            IngestEvent::Cooldown { duration } => {
                self.replace(None, "  {spinner:.cyan} {msg}");
                self.bar.set_message(format!(
                    "Cooling down for {}s before enrichment",
                    duration.as_secs()
                ));
            }
            IngestEvent::EnrichmentStarted { total } => {
                self.replace(
                    Some(total as u64),
                    "  {spinner:.cyan} Enriching   [{bar:30.green/blue}] {pos}/{len} {wide_msg}",
                );
            }
            IngestEvent::RecordEnriched { ref title, .. } => {
                self.bar.inc(1);
                self.bar.set_message(title.clone());
            }
            IngestEvent::RecordSkipped { ref title, .. } => {
                self.bar.inc(1);
                self.bar.set_message(format!("skipped {title}"));
            }
            IngestEvent::Pausing { duration, .. } => {
                self.bar
                    .set_message(format!("pausing {}s", duration.as_secs()));
            }
            IngestEvent::Done { .. } => self.bar.finish_and_clear(),
            IngestEvent::PageFetched { .. } | IngestEvent::PageSkipped { .. } => {}
        }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
