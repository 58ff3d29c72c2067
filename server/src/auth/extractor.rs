//! Bearer-token extractors.
//!
//! `AuthUser` admits any valid access token; `AdminUser` additionally
//! requires the admin role.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::token::TokenKind;
use crate::auth::Principal;
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::AuthError("unauthorized".to_string()))?
            .to_str()
            .map_err(|_| AppError::AuthError("invalid authorization format".to_string()))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::AuthError("invalid authorization format".to_string()))?;

        let claims = state.tokens.verify(token, TokenKind::Access)?;
        Ok(AuthUser(claims.into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;

        if principal.role != Role::Admin {
            tracing::warn!(user_id = %principal.user_id, "Admin route refused");
            return Err(AppError::Forbidden("no permission".to_string()));
        }

        Ok(AdminUser(principal))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}
