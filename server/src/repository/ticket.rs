use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::report::MonthlySales;
use crate::models::ticket::{NewTicket, StatusChange, TicketDetail, TicketDetailRow};
use crate::repository::{ledger, TicketRepository};
use crate::utils::error::AppError;

/// Ticket columns joined with the owning user and event projections.
macro_rules! ticket_detail_query {
    ($tail:literal) => {
        concat!(
            "SELECT t.id, t.user_id,
                    u.name AS user_name, u.email AS user_email,
                    u.phone AS user_phone, u.address AS user_address,
                    t.event_id, e.name AS event_name, e.description AS event_description,
                    t.qty, t.unit_price, t.total_amount, t.status, t.created_at, t.updated_at
             FROM tickets t
             JOIN users u ON u.id = t.user_id
             JOIN events e ON e.id = t.event_id ",
            $tail
        )
    };
}

#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn fetch_detail(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<TicketDetail>, sqlx::Error> {
    let row = sqlx::query_as::<_, TicketDetailRow>(ticket_detail_query!(
        "WHERE t.id = $1 AND t.deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(TicketDetail::from))
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn create_reserved(&self, ticket: NewTicket) -> Result<TicketDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tickets (id, user_id, event_id, qty, unit_price, total_amount, status)
             VALUES ($1, $2, $3, $4, $5, $6, 'waiting')",
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(ticket.event_id)
        .bind(ticket.qty)
        .bind(ticket.unit_price)
        .bind(ticket.total_amount)
        .execute(&mut *tx)
        .await?;

        if !ledger::reserve(&mut tx, ticket.event_id, ticket.qty).await? {
            tx.rollback().await?;
            return Err(AppError::QuantityConflict {
                requested: ticket.qty,
            });
        }

        let detail = fetch_detail(&mut tx, ticket.id).await?.ok_or_else(|| {
            AppError::InternalServerError(format!("ticket {} missing after insert", ticket.id))
        })?;

        tx.commit().await?;
        Ok(detail)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketDetail>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_detail(&mut conn, id).await?)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, AppError> {
        let rows = sqlx::query_as::<_, TicketDetailRow>(ticket_detail_query!(
            "WHERE t.user_id = $1 AND t.deleted_at IS NULL ORDER BY t.created_at DESC, t.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TicketDetail::from).collect())
    }

    async fn find_all(&self) -> Result<Vec<TicketDetail>, AppError> {
        let rows = sqlx::query_as::<_, TicketDetailRow>(ticket_detail_query!(
            "WHERE t.deleted_at IS NULL ORDER BY t.created_at DESC, t.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TicketDetail::from).collect())
    }

    async fn update_status(&self, change: StatusChange) -> Result<TicketDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<(Uuid, i32)> = sqlx::query_as(
            "UPDATE tickets
             SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2 AND deleted_at IS NULL
             RETURNING event_id, qty",
        )
        .bind(change.ticket_id)
        .bind(change.from)
        .bind(change.to)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((event_id, qty)) = updated else {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "ticket {} is no longer {}",
                change.ticket_id, change.from
            )));
        };

        if change.release_capacity && !ledger::release(&mut tx, event_id, qty).await? {
            tx.rollback().await?;
            return Err(AppError::InternalServerError(format!(
                "event {event_id} missing while releasing capacity"
            )));
        }

        let detail = fetch_detail(&mut tx, change.ticket_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "ticket {} missing after status update",
                    change.ticket_id
                ))
            })?;

        tx.commit().await?;
        Ok(detail)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE tickets SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("ticket {id} not found")));
        }
        Ok(())
    }

    async fn monthly_sales(&self) -> Result<Vec<MonthlySales>, AppError> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            "SELECT e.id AS event_id,
                    e.name AS event_name,
                    e.description AS event_description,
                    to_char(date_trunc('month', t.created_at AT TIME ZONE 'UTC'), 'YYYY-MM') AS month,
                    SUM(t.qty)::BIGINT AS total_qty,
                    SUM(t.total_amount) AS total_sales
             FROM tickets t
             JOIN events e ON e.id = t.event_id
             WHERE t.status = 'confirmed' AND t.deleted_at IS NULL
             GROUP BY month, e.id, e.name, e.description
             ORDER BY month, e.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
