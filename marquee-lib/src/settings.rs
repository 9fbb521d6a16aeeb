//! Settings file for ingestion tunables.
//!
//! Lives at `~/.config/marquee/settings.toml`. Every field is optional;
//! anything missing falls back to the defaults below.
//!
//! ```toml
//! [ingest]
//! workers = 15
//! years_back = 55
//!
//! [query]
//! min_vote_count = 100
//! excluded_genres = [10770]
//! ```

use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::throttle::ThrottleConfig;

/// Canonical path to the settings file: `~/.config/marquee/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("marquee").join("settings.toml")
}

/// Whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestSettings,
    pub query: QuerySettings,
}

/// `[ingest]`: pool size, paging and throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub workers: usize,
    pub max_pages: u32,
    /// How many years before `last_year` discovery starts at.
    pub years_back: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_year: Option<i32>,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub task_delay_ms: u64,
    pub pause_every: usize,
    pub pause_secs: u64,
    /// Wait between discovery and enrichment.
    pub cooldown_secs: u64,
    /// Token bucket rate; 0 disables it.
    pub requests_per_second: u32,
    pub use_total_pages: bool,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            workers: 15,
            max_pages: 500,
            years_back: 55,
            first_year: None,
            last_year: None,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            task_delay_ms: 50,
            pause_every: 1000,
            pause_secs: 10,
            cooldown_secs: 10,
            requests_per_second: 40,
            use_total_pages: true,
        }
    }
}

impl IngestSettings {
    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            requests_per_second: NonZeroU32::new(self.requests_per_second),
            task_delay: Duration::from_millis(self.task_delay_ms),
            pause_every: self.pause_every,
            pause: Duration::from_secs(self.pause_secs),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Upper bound on one pool item: two requests, each allowed a timed-out
    /// attempt, a retry delay and a timed-out retry, plus slack for token waits.
    /// Batch pauses are not included.
    pub fn item_timeout(&self) -> Duration {
        let request = 2 * self.request_timeout() + self.retry_delay();
        2 * request + ITEM_TIMEOUT_SLACK
    }

    /// Resolve the inclusive year range, given the current year.
    pub fn year_range(&self, current_year: i32) -> (i32, i32) {
        let last = self.last_year.unwrap_or(current_year);
        let first = self.first_year.unwrap_or(last - self.years_back);
        (first, last)
    }
}

const ITEM_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// `[query]`: the fixed filter template applied to every discovery page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub language: String,
    pub sort_by: String,
    pub min_vote_count: u32,
    pub min_vote_average: f32,
    pub min_runtime: u32,
    pub excluded_genres: Vec<u32>,
    pub release_types: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            sort_by: "popularity.desc".to_string(),
            min_vote_count: 100,
            min_vote_average: 5.0,
            min_runtime: 60,
            excluded_genres: vec![10770],
            release_types: vec![2, 3],
            origin_country: None,
            original_language: None,
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_settings(contents: &str) -> io::Result<Settings> {
    toml::from_str(contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> io::Result<Settings> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e),
    }
}

/// Load settings from the canonical location.
pub fn load_settings() -> io::Result<Settings> {
    load_settings_from(&settings_path())
}

/// Write settings to `path` atomically, creating parent directories.
pub fn save_settings(settings: &Settings, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(settings).map_err(io::Error::other)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
