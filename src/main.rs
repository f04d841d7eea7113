use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use ticket_purchase_server::config::Config;
use ticket_purchase_server::startup::{self, StartupError};

const DEFAULT_LOG_FILTER: &str = "ticket_purchase_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        address = %config.bind_address(),
        backend = ?config.store_backend,
        "Loaded configuration"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e);
    }
    Ok(())
}
