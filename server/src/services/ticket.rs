//! Ticket issuance and status management.
//!
//! Issuance never holds a lock in process. The event is read once for
//! pricing and an early stock check, then [`TicketRepository::create_reserved`]
//! re-checks capacity inside the insert transaction; losing that race
//! surfaces as [`AppError::QuantityConflict`] with nothing persisted.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::config::TicketPolicy;
use crate::models::report::MonthlySales;
use crate::models::ticket::{NewTicket, StatusChange, TicketDetail, TicketStatus};
use crate::repository::{EventRepository, TicketRepository};
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct TicketService {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    policy: TicketPolicy,
}

impl TicketService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        policy: TicketPolicy,
    ) -> Self {
        Self {
            events,
            tickets,
            policy,
        }
    }

    /// Issues `qty` tickets of `event_id` to the principal.
    pub async fn issue(
        &self,
        principal: &Principal,
        event_id: Uuid,
        qty: i32,
    ) -> Result<TicketDetail, AppError> {
        if qty <= 0 {
            return Err(AppError::InvalidQuantity(qty));
        }

        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::EventNotFound(event_id))?;

        if qty > event.capacity {
            warn!(%event_id, qty, available = event.capacity, "Insufficient stock");
            return Err(AppError::InsufficientStock {
                requested: qty,
                available: event.capacity,
            });
        }

        let ticket = NewTicket::priced(principal.user_id, &event, qty);

        match self.tickets.create_reserved(ticket).await {
            Ok(detail) => {
                info!(
                    ticket_id = %detail.id,
                    %event_id,
                    user_id = %principal.user_id,
                    qty,
                    total_amount = %detail.total_amount,
                    "Ticket issued"
                );
                Ok(detail)
            }
            Err(err @ AppError::QuantityConflict { .. }) => {
                warn!(%event_id, qty, "Capacity taken by a concurrent purchase");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Moves a ticket to `next` under the configured [`TicketPolicy`].
    pub async fn set_status(
        &self,
        ticket_id: Uuid,
        next: TicketStatus,
    ) -> Result<TicketDetail, AppError> {
        let current = self.by_id_unchecked(ticket_id).await?;
        if current.status == next {
            return Ok(current);
        }

        let change = self.plan_transition(ticket_id, current.status, next)?;
        let detail = self.tickets.update_status(change).await?;

        info!(
            %ticket_id,
            from = %change.from,
            to = %change.to,
            released = change.release_capacity,
            "Ticket status changed"
        );
        Ok(detail)
    }

    fn plan_transition(
        &self,
        ticket_id: Uuid,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<StatusChange, AppError> {
        let allowed = if self.policy.strict_transitions {
            from.can_transition_to(to)
        } else {
            // Capacity already went back to the event; reviving the ticket
            // would hand out seats twice.
            !(self.policy.cancel_restores_capacity && from == TicketStatus::Canceled)
        };

        if !allowed {
            return Err(AppError::InvalidTransition { from, to });
        }

        Ok(StatusChange {
            ticket_id,
            from,
            to,
            release_capacity: self.policy.cancel_restores_capacity
                && to == TicketStatus::Canceled,
        })
    }

    /// Owners may read their own tickets; admins may read any.
    pub async fn by_id(&self, principal: &Principal, id: Uuid) -> Result<TicketDetail, AppError> {
        let ticket = self.by_id_unchecked(id).await?;
        if ticket.user_id != principal.user_id && !principal.is_admin() {
            return Err(AppError::Forbidden("no permission".to_string()));
        }
        Ok(ticket)
    }

    async fn by_id_unchecked(&self, id: Uuid) -> Result<TicketDetail, AppError> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket {id} not found")))
    }

    pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, AppError> {
        self.tickets.find_by_user(user_id).await
    }

    pub async fn all(&self) -> Result<Vec<TicketDetail>, AppError> {
        self.tickets.find_all().await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.tickets.delete(id).await?;
        info!(ticket_id = %id, "Ticket deleted");
        Ok(())
    }

    pub async fn monthly_report(&self) -> Result<Vec<MonthlySales>, AppError> {
        self.tickets.monthly_sales().await
    }
}
