use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        password::{hash_password, verify_password},
        services::{is_valid_email, normalize_email, JwtKeys},
    },
    error::AppError,
    state::AppState,
    users::repo_types::{NewUser, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

fn token_pair(state: &AppState, user: &User) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.issue_access(user).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        AppError::from(e)
    })?;
    let refresh_token = keys.issue_refresh(user).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        AppError::from(e)
    })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);
    let nickname = payload.nickname.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::malformed("Invalid email").into());
    }

    if nickname.is_empty() {
        warn!("empty nickname");
        return Err(AppError::malformed("Nickname is required").into());
    }

    if payload.password.len() < state.config.min_password_len {
        warn!("password too short");
        return Err(AppError::malformed("Password too short").into());
    }

    // Ensure email is not taken
    if state
        .store
        .find_user_by_email(&payload.email)
        .await
        .map_err(AppError::from)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()).into());
    }

    let hash = hash_password(&payload.password).map_err(AppError::from)?;

    let user = state
        .store
        .create_user(NewUser {
            email: payload.email,
            password_hash: hash,
            nickname,
        })
        .await
        .map_err(AppError::from)?;

    let response = token_pair(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::malformed("Invalid email").into());
    }

    let user = match state.store.find_user_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::Unauthenticated.into());
        }
        Err(e) => {
            error!(error = %e, "find_user_by_email failed");
            return Err(AppError::from(e).into());
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(AppError::from)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthenticated.into());
    }

    let response = token_pair(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            (StatusCode::UNAUTHORIZED, "Invalid refresh token".to_string())
        })?;

    // Reload so the new pair carries the current email and nickname.
    let user = state
        .store
        .get_user(claims.base.sub)
        .await
        .map_err(AppError::from)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(token_pair(&state, &user)?))
}
