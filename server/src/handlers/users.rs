use axum::extract::State;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::models::user::{LoginRequest, RefreshTokenRequest, RegisterRequest, UpdateUserRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{created, empty_success, success};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let user = state.users.register(req).await?;
    Ok(created(user, "User registered").into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let tokens = state.users.login(req).await?;
    Ok(success(tokens, "Login successful").into_response())
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Response, AppError> {
    let tokens = state.users.refresh(req).await?;
    Ok(success(tokens, "Token refreshed").into_response())
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Response, AppError> {
    let user = state.users.find_by_id(principal.user_id).await?;
    Ok(success(user, "User retrieved").into_response())
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Response, AppError> {
    let user = state.users.update(principal.user_id, req).await?;
    Ok(success(user, "User updated").into_response())
}

pub async fn list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Response, AppError> {
    let users = state.users.list().await?;
    Ok(success(users, "Users retrieved").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.users.delete(id).await?;
    Ok(empty_success("User deleted").into_response())
}
