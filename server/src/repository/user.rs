use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserChanges};
use crate::repository::UserRepository;
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, phone, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, name, email, password_hash, role, phone, address, created_at, updated_at",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.phone)
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "email already exists"))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = COALESCE($2, name),
                 password_hash = COALESCE($3, password_hash),
                 phone = COALESCE($4, phone),
                 address = COALESCE($5, address),
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING id, name, email, password_hash, role, phone, address, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(changes.phone)
        .bind(changes.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {id} not found")));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, phone, address, created_at, updated_at
             FROM users
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, phone, address, created_at, updated_at
             FROM users
             WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, phone, address, created_at, updated_at
             FROM users
             WHERE deleted_at IS NULL
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
