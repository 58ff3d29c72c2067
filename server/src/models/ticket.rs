use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Waiting,
    Confirmed,
    Canceled,
}

impl TicketStatus {
    /// `waiting` may become `confirmed` or `canceled`; both of those are final.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Waiting, TicketStatus::Confirmed)
                | (TicketStatus::Waiting, TicketStatus::Canceled)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::Canceled => "canceled",
        })
    }
}

/// A ticket about to be issued, priced from the event as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub qty: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
}

impl NewTicket {
    pub fn priced(user_id: Uuid, event: &Event, qty: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id: event.id,
            qty,
            unit_price: event.price,
            total_amount: event.price * Decimal::from(qty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub name: String,
    pub description: String,
}

/// Ticket together with the owning user and event, as returned by every
/// ticket query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user: UserInfo,
    pub event_id: Uuid,
    pub event: EventInfo,
    pub qty: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row produced by the ticket/user/event join.
#[derive(Debug, Clone, FromRow)]
pub struct TicketDetailRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub user_address: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub event_description: String,
    pub qty: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketDetailRow> for TicketDetail {
    fn from(row: TicketDetailRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user: UserInfo {
                name: row.user_name,
                email: row.user_email,
                phone: row.user_phone,
                address: row.user_address,
            },
            event_id: row.event_id,
            event: EventInfo {
                name: row.event_name,
                description: row.event_description,
            },
            qty: row.qty,
            unit_price: row.unit_price,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A status write guarded by the status it was decided against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub ticket_id: Uuid,
    pub from: TicketStatus,
    pub to: TicketStatus,
    pub release_capacity: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueTicketRequest {
    pub event_id: Uuid,
    pub qty: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventStatus;

    #[test]
    fn only_waiting_tickets_move() {
        use TicketStatus::*;

        assert!(Waiting.can_transition_to(Confirmed));
        assert!(Waiting.can_transition_to(Canceled));
        assert!(!Confirmed.can_transition_to(Waiting));
        assert!(!Confirmed.can_transition_to(Canceled));
        assert!(!Canceled.can_transition_to(Waiting));
        assert!(!Canceled.can_transition_to(Confirmed));
        assert!(!Waiting.can_transition_to(Waiting));
    }

    #[test]
    fn priced_ticket_captures_unit_price_and_total() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: "Jazz Night".to_string(),
            description: "Live jazz".to_string(),
            price: Decimal::new(1050, 2),
            capacity: 10,
            status: EventStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let ticket = NewTicket::priced(Uuid::new_v4(), &event, 3);
        assert_eq!(ticket.event_id, event.id);
        assert_eq!(ticket.unit_price, Decimal::new(1050, 2));
        assert_eq!(ticket.total_amount, Decimal::new(3150, 2));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<UpdateTicketStatusRequest>(r#"{"status":"refunded"}"#).is_err());
        let req: UpdateTicketStatusRequest =
            serde_json::from_str(r#"{"status":"confirmed"}"#).unwrap();
        assert_eq!(req.status, TicketStatus::Confirmed);
    }
}
