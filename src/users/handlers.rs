use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ProfileView, UpdateProfileRequest};
use super::repo_types::User;
use super::services::{build_profile_view, update_profile};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).put(put_me))
        .route("/users/:id", get(get_profile))
        .route("/users/:id/follow", post(follow).delete(unfollow))
}

async fn load_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))
}

/// The authenticated user. A valid token for a deleted account is 401;
/// store failures still surface as 500.
async fn load_token_user(state: &AppState, user_id: Uuid) -> Result<User, (StatusCode, String)> {
    match load_user(state, user_id).await {
        Ok(u) => Ok(u),
        Err(AppError::NotFound(_)) => {
            warn!(%user_id, "token user not found");
            Err((StatusCode::UNAUTHORIZED, "User not found".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let user = load_token_user(&state, user_id).await?;
    Ok(Json(build_profile_view(state.store.as_ref(), &user).await?))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let user = load_user(&state, id).await?;
    Ok(Json(build_profile_view(state.store.as_ref(), &user).await?))
}

#[instrument(skip(state, payload))]
pub async fn put_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let user = load_token_user(&state, user_id).await?;
    let updated = update_profile(
        state.store.as_ref(),
        &user,
        &payload,
        state.config.min_password_len,
    )
    .await?;
    Ok(Json(build_profile_view(state.store.as_ref(), &updated).await?))
}

/// Returns the followed user's profile so clients see the new follower count.
#[instrument(skip(state))]
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let target = load_user(&state, id).await?;
    state
        .store
        .follow(user_id, target.id)
        .await
        .map_err(AppError::from)?;
    info!(follower = %user_id, following = %target.id, "followed");
    Ok(Json(build_profile_view(state.store.as_ref(), &target).await?))
}

#[instrument(skip(state))]
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, (StatusCode, String)> {
    let target = load_user(&state, id).await?;
    state
        .store
        .unfollow(user_id, target.id)
        .await
        .map_err(AppError::from)?;
    info!(follower = %user_id, following = %target.id, "unfollowed");
    Ok(Json(build_profile_view(state.store.as_ref(), &target).await?))
}
