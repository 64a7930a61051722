use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{
    entities::{comment, film},
    error::{AppError, AppResult},
    models::FilmView,
};

/// One page of films ordered by `(release_date, id)`, each annotated
/// with its live comment count. Returns the total film count alongside
/// the page so callers can build the pagination envelope.
pub async fn list_enriched(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> AppResult<(u64, Vec<FilmView>)> {
    let total = film::Entity::find().count(db).await?;

    let films = film::Entity::find()
        .order_by_asc(film::Column::ReleaseDate)
        .order_by_asc(film::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let counts = comment_counts(db, films.iter().map(|f| f.id).collect()).await?;

    let views = films
        .into_iter()
        .map(|f| FilmView {
            comment_count: counts.get(&f.id).copied().unwrap_or(0),
            id: f.id,
            title: f.title,
            release_date: f.release_date,
        })
        .collect();

    Ok((total, views))
}

pub async fn retrieve(db: &DatabaseConnection, id: i32) -> AppResult<FilmView> {
    let film = film::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Film not found."))?;

    let count = comment::Entity::find()
        .filter(comment::Column::FilmId.eq(id))
        .count(db)
        .await?;

    Ok(FilmView {
        id: film.id,
        title: film.title,
        release_date: film.release_date,
        comment_count: count as i64,
    })
}

pub async fn exists(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    Ok(film::Entity::find_by_id(id).count(db).await? > 0)
}

async fn comment_counts(
    db: &DatabaseConnection,
    film_ids: Vec<i32>,
) -> AppResult<HashMap<i32, i64>> {
    if film_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64)> = comment::Entity::find()
        .select_only()
        .column(comment::Column::FilmId)
        .column_as(comment::Column::Id.count(), "count")
        .filter(comment::Column::FilmId.is_in(film_ids))
        .group_by(comment::Column::FilmId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}
