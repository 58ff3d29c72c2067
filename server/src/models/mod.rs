pub mod event;
pub mod report;
pub mod ticket;
pub mod user;
