//! Registration, authentication and profile management.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TOKEN_TYPE;
use crate::auth::{Principal, TokenKind, TokenResponse, TokenService};
use crate::models::user::{
    normalize_email, LoginRequest, NewUser, RefreshTokenRequest, RegisterRequest, Role,
    UpdateUserRequest, User, UserChanges, UserResponse,
};
use crate::repository::UserRepository;
use crate::utils::error::AppError;
use crate::utils::validation::Validate;

const FAILED_LOGIN: &str = "email or password wrong";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {e}")))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verify task failed: {e}")))
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Creates a customer account.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        req.validate()?;

        let user = NewUser {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: hash_blocking(req.password).await?,
            role: Role::Customer,
            phone: req.phone.trim().to_string(),
            address: req.address.trim().to_string(),
        };

        let user = self.users.create(user).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AppError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            warn!("Login failed: unknown email");
            return Err(AppError::AuthError(FAILED_LOGIN.to_string()));
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::AuthError(FAILED_LOGIN.to_string()));
        }

        Ok(Principal::from(&user))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        req.validate()?;

        let principal = self.authenticate(&req.email, &req.password).await?;
        let access_token = self.tokens.issue_access_token(&principal)?;
        let refresh_token = self.tokens.issue_refresh_token(&principal)?;

        info!(user_id = %principal.user_id, "User logged in");
        Ok(TokenResponse {
            name: principal.name,
            access_token,
            refresh_token: Some(refresh_token),
            token_type: TOKEN_TYPE,
            expires_in: self.tokens.expires_in(),
        })
    }

    /// Exchanges a refresh token for a new access token, re-reading the user
    /// so deleted accounts and changed roles take effect.
    pub async fn refresh(&self, req: RefreshTokenRequest) -> Result<TokenResponse, AppError> {
        req.validate()?;

        let claims = self.tokens.verify(&req.refresh_token, TokenKind::Refresh)?;
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("invalid token refresh".to_string()))?;

        let principal = Principal::from(&user);
        let access_token = self.tokens.issue_access_token(&principal)?;

        Ok(TokenResponse {
            name: principal.name,
            access_token,
            refresh_token: None,
            token_type: TOKEN_TYPE,
            expires_in: self.tokens.expires_in(),
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<UserResponse, AppError> {
        self.find_user(id).await.map(UserResponse::from)
    }

    async fn find_user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
    }

    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()?;

        let password_hash = match req.password {
            Some(password) => Some(hash_blocking(password).await?),
            None => None,
        };

        let changes = UserChanges {
            name: req.name.map(|n| n.trim().to_string()),
            password_hash,
            phone: req.phone.map(|p| p.trim().to_string()),
            address: req.address.map(|a| a.trim().to_string()),
        };

        let user = self.users.update(id, changes).await?;
        info!(user_id = %id, "User updated");
        Ok(user.into())
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.users.delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
