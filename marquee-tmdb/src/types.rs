//! Wire types for the TMDB v3 endpoints used by the pipeline.
//!
//! TMDB sends `null` for many fields it has no value for, so scalar fields
//! decode `null` and absence alike to the type's default.

use serde::{Deserialize, Deserializer};

/// Decode `null` as `T::default()`. Pair with `#[serde(default)]` to also
/// cover a missing key.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of `/discover/movie`.
///
/// Results stay as raw JSON so a single odd entry can be skipped without
/// losing the rest of the page.
#[derive(Debug, Deserialize)]
pub struct DiscoverResponse {
    #[serde(default)]
    pub page: Option<u32>,
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Summary object inside a discover page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieSummary {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub original_title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_default")]
    pub release_date: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub adult: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub genre_ids: Vec<u32>,
}

/// `/movie/{id}` response. Only `id` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub runtime: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub adult: bool,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_default")]
    pub original_title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub genres: Vec<GenreRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreRef {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
}

/// `/movie/{id}/credits` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub cast: Vec<CastMember>,
    #[serde(default, deserialize_with = "null_default")]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub job: String,
}

/// TMDB error body, e.g.
/// `{"success": false, "status_code": 7, "status_message": "Invalid API key"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl ErrorPayload {
    /// Recognize an error payload inside a response body.
    ///
    /// A body counts as an error when it is a JSON object without the keys
    /// a real answer carries (`results`, `id`) and it either says
    /// `"success": false` or carries both `status_code` and `status_message`.
    pub fn detect(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let obj = value.as_object()?;
        if obj.contains_key("results") || obj.contains_key("id") {
            return None;
        }
        let payload: Self = serde_json::from_value(value.clone()).ok()?;
        let flagged = payload.success == Some(false)
            || (payload.status_code.is_some() && payload.status_message.is_some());
        flagged.then_some(payload)
    }

    pub fn code(&self) -> i64 {
        self.status_code.unwrap_or(0)
    }

    pub fn message(&self) -> &str {
        self.status_message.as_deref().unwrap_or("unknown error")
    }
}
