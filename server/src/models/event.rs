use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;
use crate::utils::validation::{FieldErrors, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    InProgress,
    Finished,
}

/// An event and its remaining sellable capacity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
}

/// Partial update; `capacity` is an absolute value, not a delta.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub capacity: Option<i32>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.length("name", &self.name, 1, 100);
        errors.length("description", &self.description, 1, 255);
        errors.price("price", self.price);
        errors.at_least("capacity", self.capacity, 1);
        errors.into_result()
    }
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            description: req.description.trim().to_string(),
            price: req.price,
            capacity: req.capacity,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub capacity: Option<i32>,
    pub status: Option<EventStatus>,
}

impl Validate for UpdateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.length("name", name, 1, 100);
        }
        if let Some(description) = &self.description {
            errors.length("description", description, 1, 255);
        }
        if let Some(price) = self.price {
            errors.price("price", price);
        }
        if let Some(capacity) = self.capacity {
            errors.at_least("capacity", capacity, 0);
        }
        errors.into_result()
    }
}

impl From<UpdateEventRequest> for EventChanges {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description.map(|d| d.trim().to_string()),
            price: req.price,
            capacity: req.capacity,
            status: req.status,
        }
    }
}

/// Listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
    pub search: Option<String>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Pages past this are clamped; no listing is ever that long.
pub const MAX_PAGE: i64 = 1_000_000;

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        Self {
            page: query.page.unwrap_or(1).clamp(1, MAX_PAGE),
            page_size: query
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
