use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::AdminUser;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Confirmed sales per event and calendar month.
pub async fn monthly(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Response, AppError> {
    let report = state.tickets.monthly_report().await?;
    Ok(success(report, "Monthly report retrieved").into_response())
}
