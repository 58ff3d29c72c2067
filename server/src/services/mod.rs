pub mod event;
pub mod ticket;
pub mod user;

pub use event::EventService;
pub use ticket::TicketService;
pub use user::UserService;
