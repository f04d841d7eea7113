//! Process bootstrap: store wiring, serving and graceful shutdown.

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{Config, ConfigError, StoreBackend};
use crate::routes::create_routes;
use crate::services::TicketServiceImpl;
use crate::state::AppState;
use crate::store::{
    InMemoryPurchaseStore, InMemoryTicketStore, PgPurchaseStore, PgTicketStore, PurchaseStore,
    TicketStore,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// The store handles shared by every request, built once at startup.
pub struct Stores {
    pub tickets: Arc<dyn TicketStore>,
    pub purchases: Arc<dyn PurchaseStore>,
    pool: Option<PgPool>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            tickets: Arc::new(InMemoryTicketStore::new()),
            purchases: Arc::new(InMemoryPurchaseStore::new()),
            pool: None,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tickets: Arc::new(PgTicketStore::new(pool.clone())),
            purchases: Arc::new(PgPurchaseStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub async fn connect(config: &Config) -> Result<Self, StartupError> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory stores, data will not survive a restart");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect_with(config.pg_connect_options())
                    .await?;
                tracing::info!("Successfully connected to database");

                sqlx::migrate!().run(&pool).await?;
                tracing::info!("Migrations run successfully");

                Ok(Self::postgres(pool))
            }
        }
    }

    async fn close(&self, config: &Config) {
        let Some(pool) = &self.pool else {
            return;
        };

        match tokio::time::timeout(config.shutdown_timeout, pool.close()).await {
            Ok(()) => tracing::info!("Database pool closed"),
            Err(_) => tracing::warn!(
                timeout_secs = config.shutdown_timeout.as_secs(),
                "Timed out closing database pool"
            ),
        }
    }
}

pub fn build_app(config: &Config, stores: &Stores) -> Router {
    let ticket_service = TicketServiceImpl::new(
        Arc::clone(&stores.tickets),
        Arc::clone(&stores.purchases),
    );
    create_routes(AppState::new(Arc::new(ticket_service)), config)
}

pub async fn run(config: Config) -> Result<(), StartupError> {
    let stores = Stores::connect(&config).await?;
    let app = build_app(&config, &stores);

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped accepting connections, cleaning up");
    stores.close(&config).await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
