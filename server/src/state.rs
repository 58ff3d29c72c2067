use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::{Config, TicketPolicy};
use crate::repository::{
    EventRepository, PgEventRepository, PgTicketRepository, PgUserRepository, TicketRepository,
    UserRepository,
};
use crate::services::{EventService, TicketService, UserService};

/// Storage handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub tickets: Arc<dyn TicketRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            tickets: Arc::new(PgTicketRepository::new(pool)),
        }
    }
}

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub events: EventService,
    pub tickets: TicketService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(repos: Repositories, tokens: Arc<TokenService>, policy: TicketPolicy) -> Self {
        Self {
            users: UserService::new(repos.users, tokens.clone()),
            events: EventService::new(repos.events.clone()),
            tickets: TicketService::new(repos.events, repos.tickets, policy),
            tokens,
        }
    }

    pub fn from_config(pool: PgPool, config: &Config) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            config.jwt_expired_hours,
        ));
        Self::new(Repositories::postgres(pool), tokens, config.ticket_policy)
    }
}
