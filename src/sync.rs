use std::{collections::HashSet, sync::Arc, time::Duration};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::{debug, info};

use crate::{
    cache::{Clock, TtlCell},
    catalog::CatalogClient,
    entities::film,
    error::AppResult,
};

/// Mirrors the upstream catalog into the local films table.
///
/// One run fetches every upstream page, then upserts all observed films
/// and prunes the rest in a single transaction. Runs are serialized so a
/// prune can never race an upsert from another run.
pub struct SyncEngine {
    db: DatabaseConnection,
    catalog: Arc<CatalogClient>,
    gate: TtlCell<()>,
    run_lock: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<CatalogClient>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, catalog, gate: TtlCell::new(ttl, clock), run_lock: tokio::sync::Mutex::new(()) }
    }

    /// Syncs unless a run completed within the TTL window. Read paths
    /// call this before serving, so repeated reads don't re-hit upstream.
    pub async fn ensure_fresh(&self) -> AppResult<()> {
        if self.gate.get().is_some() {
            return Ok(());
        }

        let _guard = self.run_lock.lock().await;
        // A concurrent caller may have synced while we waited.
        if self.gate.get().is_some() {
            return Ok(());
        }

        self.sync_locked().await?;
        self.gate.put(());
        Ok(())
    }

    /// Unconditional full mirror: upsert every upstream film, prune the
    /// rest. Returns the number of films present after the run.
    pub async fn sync_all(&self) -> AppResult<usize> {
        let _guard = self.run_lock.lock().await;
        self.sync_locked().await
    }

    async fn sync_locked(&self) -> AppResult<usize> {
        // All pages are fetched before any write, so an upstream failure
        // leaves the mirror at its prior state.
        let films = self.catalog.fetch_all().await?;

        let seen: HashSet<i32> = films.iter().map(|f| f.id).collect();

        let txn = self.db.begin().await?;

        for f in &films {
            let model = film::ActiveModel {
                id: Set(f.id),
                title: Set(f.title.clone()),
                release_date: Set(f.release_date.to_string()),
            };

            film::Entity::insert(model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(film::Column::Id)
                        .update_columns([film::Column::Title, film::Column::ReleaseDate])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        // Prune only after every page has been observed.
        let pruned = if seen.is_empty() {
            film::Entity::delete_many().exec(&txn).await?
        } else {
            film::Entity::delete_many()
                .filter(film::Column::Id.is_not_in(seen.iter().copied()))
                .exec(&txn)
                .await?
        };

        txn.commit().await?;

        debug!(pruned = pruned.rows_affected, "pruned stale films");
        info!(films = seen.len(), "catalog sync complete");

        Ok(seen.len())
    }
}
