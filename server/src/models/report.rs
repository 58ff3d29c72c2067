use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Confirmed sales of one event in one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MonthlySales {
    pub event_id: Uuid,
    pub event_name: String,
    pub event_description: String,
    pub month: String,
    pub total_qty: i64,
    pub total_sales: Decimal,
}
