use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::genre::GenreCatalog;

/// A person credited on a movie (director or cast member).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: u64,
    pub name: String,
}

impl PersonRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Fields produced by the enrichment pass for a single movie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub runtime_minutes: u32,
    pub director: Option<PersonRef>,
    /// Cast in billing order, unique by person id.
    pub cast: Vec<PersonRef>,
}

impl Enrichment {
    /// Build an enrichment, dropping repeated cast entries (first billing wins).
    pub fn new(runtime_minutes: u32, director: Option<PersonRef>, cast: Vec<PersonRef>) -> Self {
        Self {
            runtime_minutes,
            director,
            cast: dedup_by_id(cast),
        }
    }
}

/// One movie moving through the ingestion pipeline.
///
/// Created by the page parser with summary fields only, enriched in place
/// with runtime and credits, then given genre names as the last step.
/// The external id is fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    external_id: u64,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub original_language: String,
    /// `YYYY-MM-DD` as reported upstream; may be empty or malformed.
    pub release_date: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u32,
    pub adult: bool,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genre_ids: BTreeSet<u32>,
    pub genre_names: Vec<String>,
    pub runtime_minutes: u32,
    pub director: Option<PersonRef>,
    pub cast: Vec<PersonRef>,
}

impl MovieRecord {
    pub fn new(external_id: u64) -> Self {
        Self {
            external_id,
            ..Self::default()
        }
    }

    pub fn external_id(&self) -> u64 {
        self.external_id
    }

    /// True once runtime or credits have been merged in.
    pub fn is_enriched(&self) -> bool {
        self.runtime_minutes > 0 || self.director.is_some() || !self.cast.is_empty()
    }

    /// Merge enrichment fields. Summary fields and genre ids are untouched.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) {
        self.runtime_minutes = enrichment.runtime_minutes;
        self.director = enrichment.director;
        self.cast = dedup_by_id(enrichment.cast);
    }

    /// Fill `genre_names` from `genre_ids`, one name per id in ascending id order.
    pub fn translate_genres(&mut self, catalog: &GenreCatalog) {
        self.genre_names = catalog.translate(&self.genre_ids);
    }
}

fn dedup_by_id(people: Vec<PersonRef>) -> Vec<PersonRef> {
    let mut seen = HashSet::with_capacity(people.len());
    people.into_iter().filter(|p| seen.insert(p.id)).collect()
}
