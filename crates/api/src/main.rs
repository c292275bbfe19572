use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use persistence::repositories::{CalculationRepository, InMemoryCalculationStore};
use persistence::CalculationStore;
use traffic_calculator_api::{
    app,
    config::{Config, StorageBackend},
    middleware,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!(
        "Starting Traffic Calculator API v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store: Arc<dyn CalculationStore> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config()).await?;
            persistence::db::run_migrations(&pool).await?;
            Arc::new(CalculationRepository::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; calculations are lost on restart");
            Arc::new(InMemoryCalculationStore::new())
        }
    };

    let app = app::create_app(config.clone(), store);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
