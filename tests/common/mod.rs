#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{Request, Response, StatusCode},
    response::IntoResponse,
    routing::get,
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

use filmboard::{
    AppState,
    cache::SystemClock,
    catalog::CatalogClient,
    config::Config,
    entities::{comment, film},
    routes,
    sync::SyncEngine,
};

pub const TEST_PEER: &str = "127.0.0.1:4000";

pub async fn setup_db() -> DatabaseConnection {
    // A single pooled connection keeps every query on the same
    // in-memory database.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts).await.expect("connect in-memory db");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn test_config(catalog_base_url: &str) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        catalog_base_url: catalog_base_url.to_string(),
        catalog_rps: 100,
        upstream_timeout_secs: 5,
        sync_ttl_secs: 6 * 3600,
    }
}

pub fn build_engine(db: DatabaseConnection, catalog_base_url: &str) -> Arc<SyncEngine> {
    let config = test_config(catalog_base_url);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .unwrap();
    let catalog =
        Arc::new(CatalogClient::new(http, config.catalog_base_url.clone(), config.catalog_rps));

    Arc::new(SyncEngine::new(
        db,
        catalog,
        Duration::from_secs(config.sync_ttl_secs),
        Arc::new(SystemClock),
    ))
}

/// The real router plus a fake peer address so ConnectInfo resolves
/// under `oneshot`.
pub fn build_app(db: DatabaseConnection, catalog_base_url: &str) -> Router {
    let config = Arc::new(test_config(catalog_base_url));
    let sync = build_engine(db.clone(), catalog_base_url);
    let state = AppState { config, db, sync };

    let peer: SocketAddr = TEST_PEER.parse().unwrap();
    routes::router(state).layer(Extension(ConnectInfo(peer)))
}

// ---------------------------------------------------------------------------
// Stub upstream catalog
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct StubPage {
    pub status: u16,
    pub films: Vec<(i32, String, String)>,
}

pub fn film_page(films: &[(i32, &str, &str)]) -> StubPage {
    StubPage {
        status: 200,
        films: films
            .iter()
            .map(|(id, title, date)| (*id, title.to_string(), date.to_string()))
            .collect(),
    }
}

pub fn error_page(status: u16) -> StubPage {
    StubPage { status, films: Vec::new() }
}

#[derive(Deserialize)]
struct PageParam {
    page: Option<usize>,
}

/// Serves the given pages at `{base}/films/?page=N` with absolute `next`
/// links, mimicking the upstream catalog's wire format.
pub async fn spawn_catalog_stub(pages: Vec<StubPage>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let state = Arc::new((base.clone(), pages));
    let app = Router::new().route("/films/", get(serve_page)).with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base
}

async fn serve_page(
    State(state): State<Arc<(String, Vec<StubPage>)>>,
    Query(param): Query<PageParam>,
) -> axum::response::Response {
    let (base, pages) = &*state;
    let n = param.page.unwrap_or(1);

    let Some(page) = pages.get(n - 1) else {
        return (StatusCode::NOT_FOUND, "no such page").into_response();
    };

    if page.status != 200 {
        let status = StatusCode::from_u16(page.status).unwrap();
        return (status, "stub upstream failure").into_response();
    }

    let results: Vec<Value> = page
        .films
        .iter()
        .map(|(id, title, date)| {
            json!({
                "url": format!("{base}/films/{id}/"),
                "title": title,
                "release_date": date,
            })
        })
        .collect();

    let next = (n < pages.len()).then(|| format!("{base}/films/?page={}", n + 1));

    Json(json!({"results": results, "next": next})).into_response()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_film(db: &DatabaseConnection, id: i32, title: &str, release_date: &str) {
    film::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        release_date: Set(release_date.to_string()),
    }
    .insert(db)
    .await
    .expect("seed film");
}

pub async fn seed_comment(
    db: &DatabaseConnection,
    film_id: i32,
    text: &str,
    created_at: i64,
) -> i32 {
    let model = comment::ActiveModel {
        film_id: Set(film_id),
        text: Set(text.to_string()),
        ip_address: Set(None),
        created_at: Set(created_at),
        ..Default::default()
    };
    model.insert(db).await.expect("seed comment").id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get_req(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    post_json_with_headers(app, uri, body, &[]).await
}

pub async fn post_json_with_headers(
    app: Router,
    uri: &str,
    body: Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_req(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
