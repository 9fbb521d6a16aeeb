//! Detail and credits parsing.

use marquee_core::{Enrichment, PersonRef};

use crate::error::FetchError;
use crate::types::{CastMember, CreditsResponse, CrewMember, ErrorPayload, MovieDetail};

const DIRECTOR_JOB: &str = "Director";

fn check_error_payload(body: &str) -> Result<(), FetchError> {
    match ErrorPayload::detect(body) {
        Some(err) => Err(FetchError::Application {
            code: err.code(),
            message: err.message().to_string(),
        }),
        None => Ok(()),
    }
}

pub fn parse_detail(body: &str) -> Result<MovieDetail, FetchError> {
    check_error_payload(body)?;
    serde_json::from_str(body).map_err(|e| FetchError::malformed("movie detail", e))
}

pub fn parse_credits(body: &str) -> Result<CreditsResponse, FetchError> {
    check_error_payload(body)?;
    serde_json::from_str(body).map_err(|e| FetchError::malformed("credits", e))
}

/// First crew entry whose job is exactly "Director".
pub fn find_director(crew: &[CrewMember]) -> Option<PersonRef> {
    crew.iter()
        .filter(|c| c.job == DIRECTOR_JOB)
        .find_map(|c| c.id.map(|id| PersonRef::new(id, c.name.clone())))
}

/// Cast in billing order; entries without an id are dropped, repeats are
/// removed by [`Enrichment::new`].
pub fn cast_refs(cast: &[CastMember]) -> Vec<PersonRef> {
    cast.iter()
        .filter_map(|c| c.id.map(|id| PersonRef::new(id, c.name.clone())))
        .collect()
}

/// Combine a detail body and a credits body into enrichment fields.
///
/// Both responses must describe `external_id` when they carry an id.
pub fn parse_enrichment(
    external_id: u64,
    detail_body: &str,
    credits_body: &str,
) -> Result<Enrichment, FetchError> {
    let detail = parse_detail(detail_body)?;
    if detail.id != external_id {
        return Err(FetchError::malformed(
            "movie detail",
            format!("expected id {external_id}, got {}", detail.id),
        ));
    }

    let credits = parse_credits(credits_body)?;
    if let Some(id) = credits.id.filter(|&id| id != external_id) {
        return Err(FetchError::malformed(
            "credits",
            format!("expected id {external_id}, got {id}"),
        ));
    }

    Ok(Enrichment::new(
        detail.runtime,
        find_director(&credits.crew),
        cast_refs(&credits.cast),
    ))
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
