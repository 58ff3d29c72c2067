use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{Event, EventChanges, NewEvent, PageRequest};
use crate::repository::EventRepository;
use crate::utils::error::AppError;

const EVENT_EXISTS: &str = "event already exists";

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, name, description, price, capacity)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, description, price, capacity, status, created_at, updated_at",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.price)
        .bind(event.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, EVENT_EXISTS))
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 capacity = COALESCE($5, capacity),
                 status = COALESCE($6, status),
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING id, name, description, price, capacity, status, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.capacity)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, EVENT_EXISTS))?
        .ok_or_else(|| AppError::NotFound(format!("event {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE events SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("event {id} not found")));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, name, description, price, capacity, status, created_at, updated_at
             FROM events
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError> {
        let pattern = page.search.as_deref().map(like_pattern);

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM events
             WHERE deleted_at IS NULL AND ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let events = sqlx::query_as::<_, Event>(
            "SELECT id, name, description, price, capacity, status, created_at, updated_at
             FROM events
             WHERE deleted_at IS NULL AND ($1::text IS NULL OR name ILIKE $1)
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3",
        )
        .bind(pattern.as_deref())
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((events, total))
    }
}
