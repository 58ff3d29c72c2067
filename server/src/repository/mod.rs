//! Storage boundaries.
//!
//! Each trait has one PostgreSQL implementation; services hold them as
//! `Arc<dyn ...>` so the issuance rules can be exercised without a database.

pub mod event;
pub mod ledger;
pub mod ticket;
pub mod user;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::event::{Event, EventChanges, NewEvent, PageRequest};
use crate::models::report::MonthlySales;
use crate::models::ticket::{NewTicket, StatusChange, TicketDetail};
use crate::models::user::{NewUser, User, UserChanges};
use crate::utils::error::AppError;

pub use event::PgEventRepository;
pub use ticket::PgTicketRepository;
pub use user::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_all(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fails with `Conflict` when a live event already has the name.
    async fn create(&self, event: NewEvent) -> Result<Event, AppError>;
    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Event, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError>;
    /// One page of live events plus the total number of matches.
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Inserts the ticket and takes its quantity from the event's capacity
    /// as one atomic unit. Fails with `QuantityConflict`, persisting
    /// nothing, when the capacity no longer covers the quantity.
    async fn create_reserved(&self, ticket: NewTicket) -> Result<TicketDetail, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketDetail>, AppError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, AppError>;
    async fn find_all(&self) -> Result<Vec<TicketDetail>, AppError>;
    /// Compare-and-set on the ticket status, releasing capacity in the same
    /// transaction when asked. Fails with `Conflict` if the status is no
    /// longer `change.from`.
    async fn update_status(&self, change: StatusChange) -> Result<TicketDetail, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    async fn monthly_sales(&self) -> Result<Vec<MonthlySales>, AppError>;
}
