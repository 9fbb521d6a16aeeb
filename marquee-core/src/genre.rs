use std::collections::{BTreeSet, HashMap};

/// Name used for genre codes the catalog does not know.
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Movie genre codes as published by TMDB.
const TMDB_MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Immutable lookup from genre code to display name.
///
/// Built once by the caller and shared by reference; there is no global
/// instance.
#[derive(Debug, Clone)]
pub struct GenreCatalog {
    names: HashMap<u32, String>,
}

impl Default for GenreCatalog {
    fn default() -> Self {
        Self::tmdb_movie_genres()
    }
}

impl GenreCatalog {
    /// Catalog with the standard TMDB movie genre list.
    pub fn tmdb_movie_genres() -> Self {
        Self::from_pairs(TMDB_MOVIE_GENRES.iter().map(|&(id, name)| (id, name)))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    /// Display name for a code, or [`UNKNOWN_GENRE`].
    pub fn name(&self, id: u32) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNKNOWN_GENRE)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.names.contains_key(&id)
    }

    /// Names for every id, in ascending id order. Never shorter than `ids`.
    pub fn translate(&self, ids: &BTreeSet<u32>) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/genre_tests.rs"]
mod tests;
