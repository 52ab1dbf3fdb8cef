use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use medbot_core::{
    ChatService, CoreConfig, DatabaseLocation, resolve_clinical_tables, seed_reference_data,
    seed_symptom_references,
};

/// Main entry point for the MedBot server
///
/// Loads the clinical tables, opens (and migrates) the store, seeds the reference conditions
/// and symptom references that are missing, and serves the REST API.
///
/// # Environment Variables
/// - `MEDBOT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDBOT_DATABASE`: SQLite file, or `:memory:` (default: "medbot.db")
/// - `MEDBOT_TABLES_FILE`: YAML file replacing the built-in clinical tables
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the clinical tables cannot be loaded or fail validation,
/// - the store cannot be opened, migrated or seeded, or
/// - the server address cannot be bound or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("medbot=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MEDBOT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let database = DatabaseLocation::from_env_value(std::env::var("MEDBOT_DATABASE").ok());
    let tables_override = std::env::var("MEDBOT_TABLES_FILE").ok().map(PathBuf::from);

    let cfg = CoreConfig::new(database, resolve_clinical_tables(tables_override)?);
    tracing::info!("++ Using MedBot database {}", cfg.database());

    let store = Arc::new(cfg.open_store()?);
    seed_reference_data(store.as_ref())?;
    seed_symptom_references(store.as_ref())?;

    let chat_service = Arc::new(ChatService::new(store, cfg.tables()));
    let app = router(AppState::new(chat_service));

    tracing::info!("++ Starting MedBot REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
