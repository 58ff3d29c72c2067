use axum::extract::State;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::models::event::{CreateEventRequest, PageQuery, UpdateEventRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{Json, Path, Query};
use crate::utils::response::{created, empty_success, success};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = state.events.list(query).await?;
    Ok(success(page, "Events retrieved").into_response())
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events.find_by_id(id).await?;
    Ok(success(event, "Event retrieved").into_response())
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event = state.events.create(req).await?;
    Ok(created(event, "Event created").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let event = state.events.update(id, req).await?;
    Ok(success(event, "Event updated").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.events.delete(id).await?;
    Ok(empty_success("Event deleted").into_response())
}
