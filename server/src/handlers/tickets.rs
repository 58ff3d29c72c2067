use axum::extract::State;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::models::ticket::{IssueTicketRequest, UpdateTicketStatusRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{Json, Path};
use crate::utils::response::{created, empty_success, success};

pub async fn issue(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<IssueTicketRequest>,
) -> Result<Response, AppError> {
    let ticket = state
        .tickets
        .issue(&principal, req.event_id, req.qty)
        .await?;
    Ok(created(ticket, "Ticket issued").into_response())
}

pub async fn mine(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Response, AppError> {
    let tickets = state.tickets.by_user(principal.user_id).await?;
    Ok(success(tickets, "Tickets retrieved").into_response())
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket = state.tickets.by_id(&principal, id).await?;
    Ok(success(ticket, "Ticket retrieved").into_response())
}

pub async fn list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Response, AppError> {
    let tickets = state.tickets.all().await?;
    Ok(success(tickets, "Tickets retrieved").into_response())
}

pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketStatusRequest>,
) -> Result<Response, AppError> {
    let ticket = state.tickets.set_status(id, req.status).await?;
    Ok(success(ticket, "Ticket status updated").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.tickets.delete(id).await?;
    Ok(empty_success("Ticket deleted").into_response())
}
