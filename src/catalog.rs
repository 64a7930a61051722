use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use jiff::civil::Date;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// One normalized film record from the upstream catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogFilm {
    pub id: i32,
    pub title: String,
    pub release_date: Date,
}

pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl CatalogClient {
    pub fn new(client: reqwest::Client, base_url: String, rps: u32) -> Self {
        let limiter =
            Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps.max(1)).unwrap())));
        Self { client, base_url, limiter }
    }

    pub fn first_page_url(&self) -> String {
        format!("{}/films/", self.base_url.trim_end_matches('/'))
    }

    /// Fetches one catalog page and normalizes its records. Returns the
    /// absolute URL of the next page, if any.
    pub async fn fetch_page(&self, url: &str) -> AppResult<(Vec<CatalogFilm>, Option<String>)> {
        self.limiter.until_ready().await;

        debug!(url = %url, "fetching catalog page");

        let resp = self.client.get(url).send().await.map_err(|err| {
            AppError::UpstreamUnavailable { status: None, body: err.to_string() }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable { status: Some(status.as_u16()), body });
        }

        let page: FilmsPage = resp
            .json()
            .await
            .map_err(|err| AppError::MalformedRecord(format!("invalid page payload: {err}")))?;

        let mut films = Vec::with_capacity(page.results.len());
        for raw in page.results {
            films.push(normalize(raw)?);
        }

        debug!(films = films.len(), has_next = page.next.is_some(), "parsed catalog page");

        Ok((films, page.next))
    }

    /// Walks the catalog from the first page until `next` is null.
    pub async fn fetch_all(&self) -> AppResult<Vec<CatalogFilm>> {
        let mut films = Vec::new();
        let mut next_url = Some(self.first_page_url());

        while let Some(url) = next_url {
            let (page, next) = self.fetch_page(&url).await?;
            films.extend(page);
            next_url = next;
        }

        Ok(films)
    }
}

#[derive(Debug, Deserialize)]
struct FilmsPage {
    #[serde(default)]
    results: Vec<RawFilm>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFilm {
    url: String,
    #[serde(default)]
    title: String,
    release_date: Option<String>,
}

fn normalize(raw: RawFilm) -> AppResult<CatalogFilm> {
    let id = extract_id(&raw.url)?;
    let release_date = raw
        .release_date
        .as_deref()
        .ok_or_else(|| AppError::MalformedRecord(format!("film {id} has no release_date")))?
        .parse::<Date>()
        .map_err(|err| AppError::MalformedRecord(format!("film {id} release_date: {err}")))?;

    Ok(CatalogFilm { id, title: raw.title, release_date })
}

/// Extracts the numeric id from a catalog resource URL, e.g.
/// `https://swapi.dev/api/films/1/` -> 1.
fn extract_id(url: &str) -> AppResult<i32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::MalformedRecord(format!("no numeric id in url {url:?}")))
}
