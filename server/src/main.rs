use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ticket_server::config::Config;
use ticket_server::routes::create_routes;
use ticket_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    tracing::info!(
        strict_transitions = config.ticket_policy.strict_transitions,
        cancel_restores_capacity = config.ticket_policy.cancel_restores_capacity,
        "Ticket policy loaded"
    );

    let state = AppState::from_config(pool, &config);
    let app = create_routes(state, &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await.expect("Server failed");
}
