//! In-memory repositories for driving the services and router without a
//! database. The ticket store applies the same conditional capacity check
//! as the PostgreSQL ledger, under one mutex.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use ticket_server::auth::password::hash_password;
use ticket_server::auth::{Principal, TokenService};
use ticket_server::config::TicketPolicy;
use ticket_server::models::event::{Event, EventChanges, EventStatus, NewEvent, PageRequest};
use ticket_server::models::report::MonthlySales;
use ticket_server::models::ticket::{
    EventInfo, NewTicket, StatusChange, TicketDetail, TicketStatus, UserInfo,
};
use ticket_server::models::user::{NewUser, Role, User, UserChanges};
use ticket_server::repository::{EventRepository, TicketRepository, UserRepository};
use ticket_server::state::{AppState, Repositories};
use ticket_server::utils::error::AppError;

/// One `tickets` row as the in-memory store keeps it.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub qty: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct-horse";

#[derive(Default)]
pub struct Store {
    pub users: HashMap<Uuid, User>,
    pub deleted_users: HashSet<Uuid>,
    pub events: HashMap<Uuid, Event>,
    pub deleted_events: HashSet<Uuid>,
    pub tickets: HashMap<Uuid, Ticket>,
    pub deleted_tickets: HashSet<Uuid>,
}

pub type SharedStore = Arc<Mutex<Store>>;

impl Store {
    fn detail(&self, ticket: &Ticket) -> TicketDetail {
        let user = &self.users[&ticket.user_id];
        let event = &self.events[&ticket.event_id];
        TicketDetail {
            id: ticket.id,
            user_id: ticket.user_id,
            user: UserInfo {
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                address: user.address.clone(),
            },
            event_id: ticket.event_id,
            event: EventInfo {
                name: event.name.clone(),
                description: event.description.clone(),
            },
            qty: ticket.qty,
            unit_price: ticket.unit_price,
            total_amount: ticket.total_amount,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }

    fn live_ticket(&self, id: Uuid) -> Option<&Ticket> {
        self.tickets
            .get(&id)
            .filter(|_| !self.deleted_tickets.contains(&id))
    }
}

pub struct MemoryUsers(pub SharedStore);
pub struct MemoryEvents(pub SharedStore);
pub struct MemoryTickets(pub SharedStore);

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut store = self.0.lock().unwrap();
        let taken = store
            .users
            .values()
            .any(|u| u.email == user.email && !store.deleted_users.contains(&u.id));
        if taken {
            return Err(AppError::Conflict("email already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone: user.phone,
            address: user.address,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let mut store = self.0.lock().unwrap();
        if store.deleted_users.contains(&id) {
            return Err(AppError::NotFound(format!("user {id} not found")));
        }
        let user = store
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        if let Some(address) = changes.address {
            user.address = address;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut store = self.0.lock().unwrap();
        if !store.users.contains_key(&id) || !store.deleted_users.insert(id) {
            return Err(AppError::NotFound(format!("user {id} not found")));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let store = self.0.lock().unwrap();
        Ok(store
            .users
            .get(&id)
            .filter(|_| !store.deleted_users.contains(&id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.0.lock().unwrap();
        Ok(store
            .users
            .values()
            .find(|u| u.email == email && !store.deleted_users.contains(&u.id))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let store = self.0.lock().unwrap();
        Ok(store
            .users
            .values()
            .filter(|u| !store.deleted_users.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventRepository for MemoryEvents {
    async fn create(&self, event: NewEvent) -> Result<Event, AppError> {
        let mut store = self.0.lock().unwrap();
        let taken = store
            .events
            .values()
            .any(|e| e.name == event.name && !store.deleted_events.contains(&e.id));
        if taken {
            return Err(AppError::Conflict("event already exists".to_string()));
        }

        let now = Utc::now();
        let event = Event {
            id: event.id,
            name: event.name,
            description: event.description,
            price: event.price,
            capacity: event.capacity,
            status: EventStatus::Active,
            created_at: now,
            updated_at: now,
        };
        store.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        let mut store = self.0.lock().unwrap();
        if store.deleted_events.contains(&id) {
            return Err(AppError::NotFound(format!("event {id} not found")));
        }
        let event = store
            .events
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("event {id} not found")))?;

        if let Some(name) = changes.name {
            event.name = name;
        }
        if let Some(description) = changes.description {
            event.description = description;
        }
        if let Some(price) = changes.price {
            event.price = price;
        }
        if let Some(capacity) = changes.capacity {
            event.capacity = capacity;
        }
        if let Some(status) = changes.status {
            event.status = status;
        }
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut store = self.0.lock().unwrap();
        if !store.events.contains_key(&id) || !store.deleted_events.insert(id) {
            return Err(AppError::NotFound(format!("event {id} not found")));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let store = self.0.lock().unwrap();
        Ok(store
            .events
            .get(&id)
            .filter(|_| !store.deleted_events.contains(&id))
            .cloned())
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError> {
        let store = self.0.lock().unwrap();
        let needle = page.search.as_ref().map(|s| s.to_lowercase());
        let mut matches: Vec<Event> = store
            .events
            .values()
            .filter(|e| !store.deleted_events.contains(&e.id))
            .filter(|e| match &needle {
                Some(needle) => e.name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl TicketRepository for MemoryTickets {
    async fn create_reserved(&self, ticket: NewTicket) -> Result<TicketDetail, AppError> {
        let mut store = self.0.lock().unwrap();
        let live = !store.deleted_events.contains(&ticket.event_id);
        let event = store
            .events
            .get_mut(&ticket.event_id)
            .filter(|_| live)
            .filter(|e| ticket.qty > 0 && e.capacity >= ticket.qty)
            .ok_or(AppError::QuantityConflict {
                requested: ticket.qty,
            })?;
        event.capacity -= ticket.qty;

        let now = Utc::now();
        let ticket = Ticket {
            id: ticket.id,
            user_id: ticket.user_id,
            event_id: ticket.event_id,
            qty: ticket.qty,
            unit_price: ticket.unit_price,
            total_amount: ticket.total_amount,
            status: TicketStatus::Waiting,
            created_at: now,
            updated_at: now,
        };
        store.tickets.insert(ticket.id, ticket.clone());
        Ok(store.detail(&ticket))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketDetail>, AppError> {
        let store = self.0.lock().unwrap();
        Ok(store.live_ticket(id).map(|t| store.detail(t)))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, AppError> {
        let store = self.0.lock().unwrap();
        let mut tickets: Vec<TicketDetail> = store
            .tickets
            .values()
            .filter(|t| t.user_id == user_id && !store.deleted_tickets.contains(&t.id))
            .map(|t| store.detail(t))
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn find_all(&self) -> Result<Vec<TicketDetail>, AppError> {
        let store = self.0.lock().unwrap();
        let mut tickets: Vec<TicketDetail> = store
            .tickets
            .values()
            .filter(|t| !store.deleted_tickets.contains(&t.id))
            .map(|t| store.detail(t))
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn update_status(&self, change: StatusChange) -> Result<TicketDetail, AppError> {
        let mut store = self.0.lock().unwrap();
        let current = store
            .live_ticket(change.ticket_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("ticket {} not found", change.ticket_id)))?;
        if current.status != change.from {
            return Err(AppError::Conflict(format!(
                "ticket {} is no longer {}",
                change.ticket_id, change.from
            )));
        }

        if change.release_capacity {
            if let Some(event) = store.events.get_mut(&current.event_id) {
                event.capacity += current.qty;
            }
        }

        let ticket = store.tickets.get_mut(&change.ticket_id).expect("ticket present");
        ticket.status = change.to;
        ticket.updated_at = Utc::now();
        let ticket = ticket.clone();
        Ok(store.detail(&ticket))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut store = self.0.lock().unwrap();
        if store.live_ticket(id).is_none() {
            return Err(AppError::NotFound(format!("ticket {id} not found")));
        }
        store.deleted_tickets.insert(id);
        Ok(())
    }

    async fn monthly_sales(&self) -> Result<Vec<MonthlySales>, AppError> {
        let store = self.0.lock().unwrap();
        let mut totals: BTreeMap<(String, Uuid), (i64, Decimal)> = BTreeMap::new();
        for ticket in store.tickets.values() {
            if ticket.status != TicketStatus::Confirmed || store.deleted_tickets.contains(&ticket.id)
            {
                continue;
            }
            let month = format!(
                "{:04}-{:02}",
                ticket.created_at.year(),
                ticket.created_at.month()
            );
            let entry = totals
                .entry((month, ticket.event_id))
                .or_insert((0, Decimal::ZERO));
            entry.0 += i64::from(ticket.qty);
            entry.1 += ticket.total_amount;
        }

        Ok(totals
            .into_iter()
            .map(|((month, event_id), (total_qty, total_sales))| {
                let event = &store.events[&event_id];
                MonthlySales {
                    event_id,
                    event_name: event.name.clone(),
                    event_description: event.description.clone(),
                    month,
                    total_qty,
                    total_sales,
                }
            })
            .collect())
    }
}

/// Reports a fixed capacity on every read, as a reader racing a
/// concurrent purchase would see.
pub struct StaleEvents {
    pub inner: MemoryEvents,
    pub reported_capacity: i32,
}

#[async_trait]
impl EventRepository for StaleEvents {
    async fn create(&self, event: NewEvent) -> Result<Event, AppError> {
        self.inner.create(event).await
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = self.inner.find_by_id(id).await?;
        Ok(event.map(|mut e| {
            e.capacity = self.reported_capacity;
            e
        }))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError> {
        self.inner.list(page).await
    }
}

pub fn repositories(store: &SharedStore) -> Repositories {
    Repositories {
        users: Arc::new(MemoryUsers(store.clone())),
        events: Arc::new(MemoryEvents(store.clone())),
        tickets: Arc::new(MemoryTickets(store.clone())),
    }
}

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(TEST_SECRET, 1))
}

pub struct TestApp {
    pub state: AppState,
    pub store: SharedStore,
}

impl TestApp {
    pub fn new(policy: TicketPolicy) -> Self {
        let store = SharedStore::default();
        let state = AppState::new(repositories(&store), token_service(), policy);
        Self { state, store }
    }

    pub fn seed_event(&self, name: &str, price: Decimal, capacity: i32) -> Event {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            capacity,
            status: EventStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.store
            .lock()
            .unwrap()
            .events
            .insert(event.id, event.clone());
        event
    }

    pub fn seed_user(&self, email: &str, role: Role) -> Principal {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role,
            phone: "+15550100".to_string(),
            address: "1 Test Street".to_string(),
            created_at: now,
            updated_at: now,
        };
        let principal = Principal::from(&user);
        self.store.lock().unwrap().users.insert(user.id, user);
        principal
    }

    pub fn capacity(&self, event_id: Uuid) -> i32 {
        self.store.lock().unwrap().events[&event_id].capacity
    }

    pub fn set_price(&self, event_id: Uuid, price: Decimal) {
        self.store
            .lock()
            .unwrap()
            .events
            .get_mut(&event_id)
            .unwrap()
            .price = price;
    }

    pub fn ticket_count(&self) -> usize {
        self.store.lock().unwrap().tickets.len()
    }

    pub fn access_token(&self, principal: &Principal) -> String {
        self.state.tokens.issue_access_token(principal).unwrap()
    }

    pub fn refresh_token(&self, principal: &Principal) -> String {
        self.state.tokens.issue_refresh_token(principal).unwrap()
    }
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
