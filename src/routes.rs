use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
};

use crate::{
    AppState, comments,
    error::AppResult,
    films,
    models::{self, CommentView, CreateCommentRequest, FilmView, Page, PageQuery},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/films/", get(list_films))
        .route("/api/films/{id}/", get(retrieve_film))
        .route("/api/films/{id}/comments/", get(list_film_comments).post(create_film_comment))
        .route("/api/comments/", get(list_comments))
        .route("/api/comments/{id}/", delete(delete_comment))
        .with_state(state)
}

async fn list_films(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<FilmView>>> {
    state.sync.ensure_fresh().await?;

    let (limit, offset) = query.window();
    let (total, results) = films::list_enriched(&state.db, offset, limit).await?;

    Ok(Json(Page::new("/api/films/", limit, offset, total, results)))
}

async fn retrieve_film(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<FilmView>> {
    state.sync.ensure_fresh().await?;

    Ok(Json(films::retrieve(&state.db, id).await?))
}

async fn list_film_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<CommentView>>> {
    let (limit, offset) = query.window();
    let (total, comments) = comments::list_for_film(&state.db, id, offset, limit).await?;

    let results = comments.into_iter().map(CommentView::from).collect();
    let path = format!("/api/films/{id}/comments/");
    Ok(Json(Page::new(&path, limit, offset, total, results)))
}

async fn create_film_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(body): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    let text = body.text.unwrap_or_default();
    let ip = models::client_ip(&headers, Some(peer));

    let created = comments::create(&state.db, id, &text, ip).await?;
    Ok((StatusCode::CREATED, Json(CommentView::from(created))))
}

async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<CommentView>>> {
    let (limit, offset) = query.window();
    let (total, comments) = comments::list_all(&state.db, offset, limit).await?;

    let results = comments.into_iter().map(CommentView::from).collect();
    Ok(Json(Page::new("/api/comments/", limit, offset, total, results)))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    comments::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
