use axum::Router;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use club_events_server::config::{Config, DEFAULT_LOG_FILTER};
use club_events_server::routes::create_routes;
use club_events_server::state::AppState;
use club_events_server::store::{EventsStore, InMemoryEventsStore, PgEventsStore};
use club_events_server::views::Templates;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env();

    let store: Arc<dyn EventsStore> = match &config.database_url {
        Some(database_url) => {
            let store = PgEventsStore::connect(database_url, config.database_max_connections)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            store
                .run_migrations()
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory only");
            Arc::new(InMemoryEventsStore::new())
        }
    };

    let templates = Templates::new().expect("Failed to compile templates");
    let state = AppState::new(store, Arc::new(templates));

    let app: Router = create_routes(state, &config);

    let addr = config.socket_addr().expect("Invalid HOST/PORT");
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
