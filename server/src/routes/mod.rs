use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config};
use crate::handlers::{events, health_check, reports, tickets, users};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users-register", post(users::register))
        .route("/login", post(users::login))
        .route("/refresh-token", post(users::refresh_token))
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/users", get(users::list))
        .route("/users/:id", delete(users::delete))
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/:id",
            get(events::get).put(events::update).delete(events::delete),
        )
        .route("/tickets", get(tickets::list).post(tickets::issue))
        .route("/tickets/me", get(tickets::mine))
        .route("/tickets/:id", get(tickets::get).delete(tickets::delete))
        .route("/tickets/:id/status", put(tickets::update_status))
        .route("/reports/monthly", get(reports::monthly))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state);

    apply_security_headers(router, config.production)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
}
