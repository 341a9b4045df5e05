use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ArticleSummary, CommentResponse, CreateArticleRequest, CreateCommentRequest};
use super::services;
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/articles/:id", get(get_article))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", post(create_article))
        .route("/articles/:id/like", post(like).delete(unlike))
        .route("/articles/:id/comments", post(create_comment))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleSummary>, (StatusCode, String)> {
    let article = state
        .store
        .get_article(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Article".into()))?;
    Ok(Json(services::summarize(state.store.as_ref(), &article).await?))
}

#[instrument(skip(state, body))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateArticleRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ArticleSummary>), (StatusCode, String)> {
    let summary =
        services::create_article(state.store.as_ref(), user_id, &body.title, &body.content)
            .await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/v1/articles/{}", summary.pk))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(axum::http::header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(summary)))
}

#[instrument(skip(state))]
pub async fn like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleSummary>, (StatusCode, String)> {
    Ok(Json(
        services::set_like(state.store.as_ref(), id, user_id, true).await?,
    ))
}

#[instrument(skip(state))]
pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleSummary>, (StatusCode, String)> {
    Ok(Json(
        services::set_like(state.store.as_ref(), id, user_id, false).await?,
    ))
}

#[instrument(skip(state, body))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), (StatusCode, String)> {
    let c = services::add_comment(state.store.as_ref(), id, user_id, &body.content).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            pk: c.id,
            article_pk: c.article_id,
            user_pk: c.user_id,
            content: c.content,
            created_at: c.created_at,
        }),
    ))
}
