use std::net::SocketAddr;

use axum::http::HeaderMap;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entities::comment;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Film as served by the API: mirror fields plus the live comment count.
#[derive(Clone, Debug, Serialize)]
pub struct FilmView {
    pub id: i32,
    pub title: String,
    pub release_date: String,
    pub comment_count: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    #[serde(rename = "film")]
    pub film_id: i32,
    pub text: String,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

impl From<comment::Model> for CommentView {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            film_id: model.film_id,
            text: model.text,
            ip_address: model.ip_address,
            created_at: Timestamp::from_millisecond(model.created_at)
                .unwrap_or(Timestamp::UNIX_EPOCH),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Offset/limit query parameters, shared by all list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn window(&self) -> (u64, u64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (limit, self.offset.unwrap_or(0))
    }
}

/// Pagination envelope: total count plus next/previous page links.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(path: &str, limit: u64, offset: u64, count: u64, results: Vec<T>) -> Self {
        let (next, previous) = page_links(path, limit, offset, count);
        Self { count, next, previous, results }
    }
}

fn page_links(
    path: &str,
    limit: u64,
    offset: u64,
    count: u64,
) -> (Option<String>, Option<String>) {
    let next = (offset + limit < count)
        .then(|| format!("{path}?limit={limit}&offset={}", offset + limit));
    let previous = (offset > 0).then(|| {
        let prev = offset.saturating_sub(limit);
        if prev == 0 {
            format!("{path}?limit={limit}")
        } else {
            format!("{path}?limit={limit}&offset={prev}")
        }
    });
    (next, previous)
}

/// Best-effort client address: first `X-Forwarded-For` entry, falling
/// back to the direct peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
