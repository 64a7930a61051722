use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::{
    entities::comment,
    error::{AppError, AppResult},
    films,
};

pub const MAX_TEXT_LEN: usize = 500;

/// Validates comment text and returns the trimmed form to store.
pub fn validate_text(text: &str) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation { field: "text", message: "Comment text is required." });
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation {
            field: "text",
            message: "Comment cannot exceed 500 characters.",
        });
    }
    Ok(trimmed.to_string())
}

pub async fn create(
    db: &DatabaseConnection,
    film_id: i32,
    text: &str,
    client_ip: Option<String>,
) -> AppResult<comment::Model> {
    let text = validate_text(text)?;

    if !films::exists(db, film_id).await? {
        return Err(AppError::NotFound("Film not found."));
    }

    let model = comment::ActiveModel {
        film_id: Set(film_id),
        text: Set(text),
        ip_address: Set(client_ip),
        created_at: Set(jiff::Timestamp::now().as_millisecond()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(comment_id = created.id, film_id = film_id, "comment created");
    Ok(created)
}

/// Comments for one film, ordered `(created_at, id)` ascending. Fails
/// with not-found when the film itself is absent.
pub async fn list_for_film(
    db: &DatabaseConnection,
    film_id: i32,
    offset: u64,
    limit: u64,
) -> AppResult<(u64, Vec<comment::Model>)> {
    if !films::exists(db, film_id).await? {
        return Err(AppError::NotFound("Film not found."));
    }

    let total = comment::Entity::find()
        .filter(comment::Column::FilmId.eq(film_id))
        .count(db)
        .await?;

    let comments = comment::Entity::find()
        .filter(comment::Column::FilmId.eq(film_id))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((total, comments))
}

/// Flat listing across all films, same ordering rule.
pub async fn list_all(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> AppResult<(u64, Vec<comment::Model>)> {
    let total = comment::Entity::find().count(db).await?;

    let comments = comment::Entity::find()
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((total, comments))
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let result = comment::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Comment not found."));
    }
    Ok(())
}
