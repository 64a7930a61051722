use std::{net::SocketAddr, sync::Arc, time::Duration};

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use filmboard::{
    AppState,
    cache::SystemClock,
    catalog::CatalogClient,
    config::Config,
    db, routes,
    sync::SyncEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,filmboard=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("filmboard/0.1")
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let catalog =
        Arc::new(CatalogClient::new(http, config.catalog_base_url.clone(), config.catalog_rps));

    let sync = Arc::new(SyncEngine::new(
        db.clone(),
        catalog,
        Duration::from_secs(config.sync_ttl_secs),
        Arc::new(SystemClock),
    ));

    let state = AppState { config: config.clone(), db, sync };

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
