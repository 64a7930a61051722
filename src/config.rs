use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub catalog_base_url: String,
    pub catalog_rps: u32,
    pub upstream_timeout_secs: u64,
    pub sync_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://filmboard.db?mode=rwc".to_string());

        let catalog_base_url = std::env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| "https://swapi.dev/api".to_string());

        let catalog_rps: u32 =
            std::env::var("CATALOG_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let upstream_timeout_secs: u64 =
            std::env::var("UPSTREAM_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(15);

        // Mirrored films are considered fresh for this long before a
        // request triggers another upstream sync.
        let sync_ttl_secs: u64 =
            std::env::var("SYNC_TTL_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(6 * 3600);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            catalog_base_url,
            catalog_rps,
            upstream_timeout_secs,
            sync_ttl_secs,
        })
    }
}
