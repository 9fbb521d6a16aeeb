//! Discover page parsing.

use std::collections::BTreeSet;

use marquee_core::MovieRecord;

use crate::error::FetchError;
use crate::types::{DiscoverResponse, ErrorPayload, MovieSummary};

/// Partial records from one discover page.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<MovieRecord>,
    /// Page count reported upstream, if any.
    pub total_pages: Option<u32>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse one discover page into partial records.
///
/// Only summary fields are filled; runtime stays 0, director and cast
/// empty. Entries without an id are skipped. Fails only when the body is
/// an error payload or has no `results` array.
pub fn parse_page(body: &str) -> Result<Page, FetchError> {
    if let Some(err) = ErrorPayload::detect(body) {
        return Err(FetchError::Application {
            code: err.code(),
            message: err.message().to_string(),
        });
    }

    let response: DiscoverResponse =
        serde_json::from_str(body).map_err(|e| FetchError::malformed("discover", e))?;

    let mut records = Vec::with_capacity(response.results.len());
    for (i, raw) in response.results.into_iter().enumerate() {
        match serde_json::from_value::<MovieSummary>(raw) {
            Ok(summary) => match summary_to_record(summary) {
                Some(record) => records.push(record),
                None => log::debug!("Discover result {} has no id, skipping", i),
            },
            Err(e) => log::warn!("Discover result {} is unreadable, skipping: {}", i, e),
        }
    }

    Ok(Page {
        records,
        total_pages: response.total_pages,
    })
}

fn summary_to_record(summary: MovieSummary) -> Option<MovieRecord> {
    let mut record = MovieRecord::new(summary.id?);
    record.title = summary.title;
    record.original_title = summary.original_title;
    record.overview = summary.overview;
    record.original_language = summary.original_language;
    record.release_date = summary.release_date;
    record.popularity = summary.popularity.max(0.0);
    record.vote_average = summary.vote_average;
    record.vote_count = summary.vote_count;
    record.adult = summary.adult;
    record.poster_path = summary.poster_path;
    record.backdrop_path = summary.backdrop_path;
    record.genre_ids = summary.genre_ids.into_iter().collect::<BTreeSet<_>>();
    Some(record)
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
