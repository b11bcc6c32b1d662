use std::sync::Arc;

use anyhow::Context;
use tokio::{signal, sync::mpsc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use medstock_api as api;
use medstock_api::services::permission::{
    AllowAllPermissions, HttpPermissionClient, PermissionService,
};
use medstock_api::services::reference_data::{
    HttpReferenceDataClient, InMemoryReferenceData, ReferenceDataService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await?;
    }
    api::services::reason_service::seed_built_in_reasons(&db_pool).await?;
    let db = Arc::new(db_pool);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    // External collaborators
    let reference_data: Arc<dyn ReferenceDataService> = match &cfg.reference_data_url {
        Some(url) => {
            info!("Using reference data service at {}", url);
            Arc::new(HttpReferenceDataClient::new(url.clone()))
        }
        None => {
            warn!("No reference data URL configured; using the in-memory store (local development only)");
            Arc::new(InMemoryReferenceData::new())
        }
    };
    let permissions: Arc<dyn PermissionService> = match &cfg.authorization_url {
        Some(url) => {
            info!("Using authorization service at {}", url);
            Arc::new(HttpPermissionClient::new(url.clone()))
        }
        None => {
            warn!("No authorization URL configured; all permission checks pass (local development only)");
            Arc::new(AllowAllPermissions)
        }
    };

    // Aggregate app services used by HTTP handlers
    let services = api::handlers::AppServices::new(
        db.clone(),
        reference_data,
        permissions,
        event_sender.clone(),
    );

    let app_state = api::AppState {
        db,
        config: cfg.clone(),
        event_sender,
        services,
    };

    let app = api::app_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let bind_address = cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("MedStock API listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", error);
        return;
    }
    info!("Shutdown signal received");
}
