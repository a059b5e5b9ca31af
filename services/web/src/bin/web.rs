//! services/web/src/bin/web.rs

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    seed::{populate_catalog, SeedOutcome},
    web::{router, state::AppState},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "{},tower_http=debug",
            config.log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = DbAdapter::connect(&config.database_url).await?;
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Seed the Exercise Catalog ---
    match populate_catalog(&db_adapter, &config.seed_csv_path).await? {
        SeedOutcome::AlreadySeeded => info!("Exercise catalog already seeded."),
        SeedOutcome::Inserted(count) => info!("Loaded {} exercises into the catalog.", count),
    }

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(db_adapter, config.clone()));
    let app = router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
