use std::{num::NonZeroU32, sync::Arc, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Candidate, MovieDetails},
};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    retries: u32,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        if config.tmdb_api_key.trim().is_empty() {
            warn!("Using offline TMDB catalog - no TMDB_API_KEY provided");
        }

        let rps = NonZeroU32::new(config.tmdb_rps).unwrap_or(NonZeroU32::MIN);
        Self {
            client,
            api_key: config.tmdb_api_key.clone(),
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            image_base_url: config.tmdb_image_base_url.trim_end_matches('/').to_string(),
            retries: config.tmdb_retries,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Builds the shared HTTP client with the configured request timeout.
    pub fn http_client(config: &Config) -> AppResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent("movieshelf/0.1")
            .timeout(Duration::from_secs(config.tmdb_timeout_secs.max(1)))
            .build()?)
    }

    fn offline(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    /// `GET /search/movie`, returning the `results` array as-is.
    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<Candidate>> {
        if self.offline() {
            return Ok(offline::search(title));
        }

        let url = format!("{}/search/movie", self.base_url);
        let resp: SearchResponse =
            self.get_json(&url, &[("api_key", self.api_key.as_str()), ("query", title)]).await?;

        debug!(query = %title, results = resp.results.len(), "title search finished");
        Ok(resp.results)
    }

    /// `GET /movie/<id>`, mapped onto the fields a new movie needs.
    pub async fn fetch_details(&self, external_id: i32) -> AppResult<MovieDetails> {
        let raw = if self.offline() {
            offline::details(external_id).ok_or_else(|| {
                AppError::UpstreamPayload(format!("no movie with id {external_id}"))
            })?
        } else {
            let url = format!("{}/movie/{}", self.base_url, external_id);
            self.get_json(&url, &[("api_key", self.api_key.as_str())]).await?
        };

        raw.into_details(&self.image_base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let mut attempt = 0;
        loop {
            self.limiter.until_ready().await;

            let result = self.client.get(url).query(query).send().await;
            let retryable = match &result {
                Ok(resp) => is_transient_status(resp.status()),
                Err(err) => err.is_timeout() || err.is_connect(),
            };

            if retryable && attempt < self.retries {
                attempt += 1;
                warn!(url = %url, attempt, "transient TMDB failure, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
                continue;
            }

            let body = result?.error_for_status()?.text().await?;
            return serde_json::from_str(&body)
                .map_err(|err| AppError::UpstreamPayload(err.to_string()));
        }
    }
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Leading year token of a `YYYY-MM-DD` release date.
fn release_year(release_date: &str) -> Option<i32> {
    release_date.split('-').next()?.trim().parse().ok()
}

fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> String {
    match poster_path {
        Some(path) if !path.is_empty() => {
            format!("{}/{}", image_base_url, path.trim_start_matches('/'))
        },
        _ => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    id: i32,
    title: String,
    release_date: String,
    poster_path: Option<String>,
    overview: String,
}

impl DetailsResponse {
    fn into_details(self, image_base_url: &str) -> AppResult<MovieDetails> {
        let year = release_year(&self.release_date).ok_or_else(|| {
            AppError::UpstreamPayload(format!(
                "release date {:?} of movie {} has no year",
                self.release_date, self.id
            ))
        })?;

        Ok(MovieDetails {
            id: self.id,
            img_url: poster_url(image_base_url, self.poster_path.as_deref()),
            title: self.title,
            year,
            description: self.overview,
        })
    }
}

mod offline {
    use super::DetailsResponse;
    use crate::models::Candidate;

    struct Entry {
        id: i32,
        title: &'static str,
        release_date: &'static str,
        poster_path: &'static str,
        overview: &'static str,
    }

    const CATALOG: &[Entry] = &[
        Entry {
            id: 27205,
            title: "Inception",
            release_date: "2010-07-16",
            poster_path: "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
            overview: "Cobb, a skilled thief who commits corporate espionage by infiltrating the subconscious of his targets is offered a chance to regain his old life as payment for a task considered to be impossible.",
        },
        Entry {
            id: 550,
            title: "Fight Club",
            release_date: "1999-10-15",
            poster_path: "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            overview: "A ticking-time-bomb insomniac and a slippery soap salesman channel primal male aggression into a shocking new form of therapy.",
        },
        Entry {
            id: 1817,
            title: "Phone Booth",
            release_date: "2002-11-14",
            poster_path: "/7ckj9lZqJ0sYf7fXv6bd4e7S9jn.jpg",
            overview: "A egotistical publicist is trapped in a phone booth, pinned down by an extortionist's sniper rifle.",
        },
    ];

    pub(super) fn search(query: &str) -> Vec<Candidate> {
        let needle = query.trim().to_lowercase();
        CATALOG
            .iter()
            .filter(|e| !needle.is_empty() && e.title.to_lowercase().contains(&needle))
            .map(|e| Candidate {
                id: e.id,
                title: e.title.to_string(),
                release_date: Some(e.release_date.to_string()),
                poster_path: Some(e.poster_path.to_string()),
            })
            .collect()
    }

    pub(super) fn details(id: i32) -> Option<DetailsResponse> {
        CATALOG.iter().find(|e| e.id == id).map(|e| DetailsResponse {
            id: e.id,
            title: e.title.to_string(),
            release_date: e.release_date.to_string(),
            poster_path: Some(e.poster_path.to_string()),
            overview: e.overview.to_string(),
        })
    }
}
