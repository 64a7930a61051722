use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub mod cache;
pub mod catalog;
pub mod comments;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod films;
pub mod models;
pub mod routes;
pub mod sync;

use crate::{config::Config, sync::SyncEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub sync: Arc<SyncEngine>,
}
