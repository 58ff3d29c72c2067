use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::models::event::{CreateEventRequest, Event, PageQuery, PageRequest, UpdateEventRequest};
use crate::repository::EventRepository;
use crate::utils::error::AppError;
use crate::utils::response::Paginated;
use crate::utils::validation::Validate;

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn create(&self, req: CreateEventRequest) -> Result<Event, AppError> {
        req.validate()?;

        let event = self.events.create(req.into()).await?;
        info!(event_id = %event.id, name = %event.name, capacity = event.capacity, "Event created");
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, req: UpdateEventRequest) -> Result<Event, AppError> {
        req.validate()?;

        let event = self.events.update(id, req.into()).await?;
        info!(event_id = %id, capacity = event.capacity, status = ?event.status, "Event updated");
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.events.delete(id).await?;
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Event, AppError> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {id} not found")))
    }

    pub async fn list(&self, query: PageQuery) -> Result<Paginated<Event>, AppError> {
        let page = PageRequest::from(query);
        let (events, total) = self.events.list(&page).await?;
        Ok(Paginated::new(events, page.page, page.page_size, total))
    }
}
