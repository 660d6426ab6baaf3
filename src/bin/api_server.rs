// API server binary entry point.
//
// Usage: cargo run --bin api_server

use plant_catalog::{create_router, source, AppState, FavoritesStore, MemoryCatalog};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "plant_catalog=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    // Catalog source: URL or file path; mock dataset when unset
    let plants_csv = std::env::var("PLANTS_CSV").ok();

    // Default import source for /api/import endpoints
    let import_source = std::env::var("IMPORT_CSV_URL").ok();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", data_dir);
    tracing::info!("  PLANTS_CSV: {}", plants_csv.as_deref().unwrap_or("(mock dataset)"));
    tracing::info!("  IMPORT_CSV_URL: {}", import_source.as_deref().unwrap_or("(unset)"));
    tracing::info!("  PORT: {}", port);

    // Load the catalog
    let plants = match &plants_csv {
        Some(csv_source) => source::load_source(csv_source).await?,
        None => source::mock_plants(),
    };
    tracing::info!("Catalog loaded with {} plants", plants.len());
    let catalog = Arc::new(MemoryCatalog::seeded(plants));

    // Favorites persist under DATA_DIR
    std::fs::create_dir_all(&data_dir)?;
    let favorites = FavoritesStore::load(Path::new(&data_dir).join("favorites.json"));

    let state = AppState::new(catalog, favorites, import_source);

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
