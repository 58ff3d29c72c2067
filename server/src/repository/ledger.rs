//! Capacity ledger.
//!
//! An event's `capacity` column is the only record of remaining inventory.
//! Both operations are single conditional `UPDATE`s whose predicate is
//! evaluated against the row as it is at write time; under concurrent
//! writers Postgres re-checks it after the competing transaction commits.
//! They take a connection so callers run them inside the transaction that
//! owns the matching ticket write.

use sqlx::PgConnection;
use uuid::Uuid;

/// Takes `qty` (> 0) from a live event if at least `qty` remains.
///
/// Returns `false` when the guard failed and nothing was written.
pub async fn reserve(
    conn: &mut PgConnection,
    event_id: Uuid,
    qty: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE events
         SET capacity = capacity - $2, updated_at = NOW()
         WHERE id = $1 AND deleted_at IS NULL AND $2 > 0 AND capacity >= $2",
    )
    .bind(event_id)
    .bind(qty)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Returns `qty` to an event. Applies to soft-deleted events too so a
/// canceled ticket is always accounted for.
pub async fn release(
    conn: &mut PgConnection,
    event_id: Uuid,
    qty: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE events
         SET capacity = capacity + $2, updated_at = NOW()
         WHERE id = $1 AND $2 > 0",
    )
    .bind(event_id)
    .bind(qty)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
