//! In-memory catalog API for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use marquee_lib::worker_pool::SAFETY_TIMEOUT;
use marquee_lib::{Throttle, ThrottleConfig};
use marquee_tmdb::{
    Endpoints, FetchClient, FetchError, FetchOptions, MovieFetcher, TransportCause,
};
use reqwest::Url;
use serde_json::json;

pub const BASE_URL: &str = "https://api.test/3";

/// Canned responses keyed by what the pipeline asks for. Unknown discover
/// pages come back empty; unknown movies are a 404.
#[derive(Default)]
pub struct FakeClient {
    configuration: Option<String>,
    pages: HashMap<(i32, u32), String>,
    details: HashMap<u64, String>,
    credits: HashMap<u64, String>,
    failing: HashSet<u64>,
    failing_pages: HashSet<(i32, u32)>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(mut self, body: &str) -> Self {
        self.configuration = Some(body.to_string());
        self
    }

    pub fn with_page(mut self, year: i32, page: u32, body: serde_json::Value) -> Self {
        self.pages.insert((year, page), body.to_string());
        self
    }

    pub fn with_failing_page(mut self, year: i32, page: u32) -> Self {
        self.failing_pages.insert((year, page));
        self
    }

    pub fn with_movie(
        mut self,
        id: u64,
        detail: serde_json::Value,
        credits: serde_json::Value,
    ) -> Self {
        self.details.insert(id, detail.to_string());
        self.credits.insert(id, credits.to_string());
        self
    }

    pub fn with_failing_movie(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self, path_fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|u| u.contains(path_fragment))
            .count()
    }

    fn respond(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).unwrap();
        let segments: Vec<String> = parsed
            .path_segments()
            .unwrap()
            .skip(1)
            .map(str::to_string)
            .collect();
        let param = |key: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        let failure = |status| {
            Err(FetchError::transport(
                url,
                TransportCause::Status {
                    status,
                    message: None,
                },
            ))
        };

        match segments.iter().map(String::as_str).collect::<Vec<_>>()[..] {
            ["configuration"] => Ok(self
                .configuration
                .clone()
                .unwrap_or_else(|| json!({"images": {}}).to_string())),
            ["discover", "movie"] => {
                let year: i32 = param("primary_release_date.gte").unwrap()[..4].parse().unwrap();
                let page: u32 = param("page").unwrap().parse().unwrap();
                if self.failing_pages.contains(&(year, page)) {
                    return failure(503);
                }
                Ok(self
                    .pages
                    .get(&(year, page))
                    .cloned()
                    .unwrap_or_else(|| json!({"page": page, "results": []}).to_string()))
            }
            ["movie", id] | ["movie", id, "credits"] => {
                let id: u64 = id.parse().unwrap();
                if self.failing.contains(&id) {
                    return Err(FetchError::transport(
                        url,
                        TransportCause::Other("connection reset".into()),
                    ));
                }
                let table = if segments.len() == 3 {
                    &self.credits
                } else {
                    &self.details
                };
                table.get(&id).cloned().map_or_else(|| failure(404), Ok)
            }
            _ => failure(404),
        }
    }
}

impl FetchClient for FakeClient {
    async fn fetch(&self, url: &str, throttle: &Throttle) -> Result<String, FetchError> {
        throttle.acquire().await;
        self.requests.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.respond(url)
    }
}

pub fn movie(id: u64, title: &str, genre_ids: &[u32]) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "original_title": title,
        "overview": null,
        "original_language": "en",
        "release_date": "2000-06-01",
        "popularity": 12.5,
        "vote_average": 7.1,
        "vote_count": 900,
        "adult": false,
        "poster_path": null,
        "genre_ids": genre_ids,
    })
}

pub fn page(
    page: u32,
    total_pages: Option<u32>,
    movies: Vec<serde_json::Value>,
) -> serde_json::Value {
    let mut body = json!({"page": page, "results": movies});
    if let Some(total) = total_pages {
        body["total_pages"] = json!(total);
    }
    body
}

pub fn detail(id: u64, runtime: u32) -> serde_json::Value {
    json!({"id": id, "runtime": runtime})
}

pub fn credits(
    id: u64,
    director: Option<(u64, &str)>,
    cast: &[(u64, &str)],
) -> serde_json::Value {
    let crew: Vec<_> = director
        .into_iter()
        .map(|(pid, name)| json!({"id": pid, "name": name, "job": "Director"}))
        .collect();
    let cast: Vec<_> = cast
        .iter()
        .map(|(pid, name)| json!({"id": pid, "name": name}))
        .collect();
    json!({"id": id, "cast": cast, "crew": crew})
}

pub fn endpoints() -> Endpoints {
    Endpoints::new(BASE_URL, "test-key").unwrap()
}

/// Options for a single-year run with no cooldown.
pub fn options(year: i32, workers: usize, max_pages: u32) -> FetchOptions {
    FetchOptions {
        workers,
        max_pages,
        first_year: year,
        last_year: year,
        cooldown: Duration::ZERO,
        use_total_pages: true,
        sanity_check: true,
        item_timeout: SAFETY_TIMEOUT,
    }
}

pub fn fetcher(client: Arc<FakeClient>, options: FetchOptions) -> MovieFetcher<FakeClient> {
    fetcher_with_throttle(client, options, ThrottleConfig::disabled())
}

pub fn fetcher_with_throttle(
    client: Arc<FakeClient>,
    options: FetchOptions,
    throttle: ThrottleConfig,
) -> MovieFetcher<FakeClient> {
    MovieFetcher::new(client, endpoints(), throttle).with_options(options)
}
