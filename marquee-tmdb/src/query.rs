//! URL construction for the catalog endpoints.

use marquee_lib::QuerySettings;
use reqwest::Url;

use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Fixed filter template for discovery. Year and page vary per request.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub language: String,
    pub sort_by: String,
    pub min_vote_count: u32,
    pub min_vote_average: f32,
    pub min_runtime: u32,
    pub excluded_genres: Vec<u32>,
    pub release_types: Vec<u8>,
    pub origin_country: Option<String>,
    pub original_language: Option<String>,
}

impl Default for DiscoveryQuery {
    fn default() -> Self {
        Self::from(&QuerySettings::default())
    }
}

impl From<&QuerySettings> for DiscoveryQuery {
    fn from(s: &QuerySettings) -> Self {
        Self {
            language: s.language.clone(),
            sort_by: s.sort_by.clone(),
            min_vote_count: s.min_vote_count,
            min_vote_average: s.min_vote_average,
            min_runtime: s.min_runtime,
            excluded_genres: s.excluded_genres.clone(),
            release_types: s.release_types.clone(),
            origin_country: s.origin_country.clone(),
            original_language: s.original_language.clone(),
        }
    }
}

impl DiscoveryQuery {
    /// Query pairs for one page of one release year.
    pub fn pairs(&self, year: i32, page: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("language", self.language.clone()),
            ("sort_by", self.sort_by.clone()),
            ("include_adult", "false".to_string()),
            ("include_video", "false".to_string()),
            ("page", page.to_string()),
            ("primary_release_date.gte", format!("{year:04}-01-01")),
            ("primary_release_date.lte", format!("{year:04}-12-31")),
            ("vote_count.gte", self.min_vote_count.to_string()),
            ("vote_average.gte", self.min_vote_average.to_string()),
            ("with_runtime.gte", self.min_runtime.to_string()),
        ];
        if !self.excluded_genres.is_empty() {
            pairs.push(("without_genres", join(&self.excluded_genres, ",")));
        }
        if !self.release_types.is_empty() {
            // `|` is OR for this filter
            pairs.push(("with_release_type", join(&self.release_types, "|")));
        }
        if let Some(ref country) = self.origin_country {
            pairs.push(("with_origin_country", country.clone()));
        }
        if let Some(ref lang) = self.original_language {
            pairs.push(("with_original_language", lang.clone()));
        }
        pairs
    }
}

fn join<T: ToString>(values: &[T], sep: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Base URL plus API key; builds every request URL.
#[derive(Clone)]
pub struct Endpoints {
    base: Url,
    api_key: String,
}

impl std::fmt::Debug for Endpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoints")
            .field("base", &self.base.as_str())
            .field("api_key", &"***")
            .finish()
    }
}

impl Endpoints {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::config(format!("Invalid base URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::config(format!(
                "Base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `GET /configuration`, used as a sanity call.
    pub fn configuration_url(&self) -> Url {
        self.url(&["configuration"], Vec::new())
    }

    pub fn discover_url(&self, query: &DiscoveryQuery, year: i32, page: u32) -> Url {
        self.url(&["discover", "movie"], query.pairs(year, page))
    }

    pub fn detail_url(&self, external_id: u64) -> Url {
        self.url(&["movie", &external_id.to_string()], Vec::new())
    }

    pub fn credits_url(&self, external_id: u64) -> Url {
        self.url(&["movie", &external_id.to_string(), "credits"], Vec::new())
    }

    fn url(&self, path: &[&str], pairs: Vec<(&'static str, String)>) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.api_key);
            for (k, v) in &pairs {
                query.append_pair(k, v);
            }
        }
        url
    }
}

/// Replace the `api_key` query value so URLs are safe to log.
pub fn redact_url(url: &str) -> String {
    let Some(start) = url.find("api_key=").map(|i| i + "api_key=".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    format!("{}***{}", &url[..start], &url[end..])
}
