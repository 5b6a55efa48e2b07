//! OrderDesk Server — Application entry point.

mod config;

use orderdesk_auth::{AuthService, RegisterInput};
use orderdesk_core::error::OrderDeskError;
use orderdesk_core::repository::UserRepository;
use orderdesk_db::{DbError, DbManager};
use orderdesk_orders::{SimulatedProcessor, Sweeper};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, SeedUser, ServerConfig};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Core(#[from] OrderDeskError),
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orderdesk=info")),
        )
        .json()
        .init();

    tracing::info!("Starting OrderDesk server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "OrderDesk server failed");
        std::process::exit(1);
    }

    tracing::info!("OrderDesk server stopped.");
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;

    let auth = AuthService::new(db.users(), config.auth.clone());
    if let Some(seed) = &config.seed_user {
        seed_user(&auth, seed).await?;
    }

    let sweeper = Sweeper::new(
        db.orders(),
        SimulatedProcessor::new(config.sweeper.processing_delay),
        config.sweeper.clone(),
    );
    let handle = sweeper.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    handle.shutdown().await;
    Ok(())
}

/// Register the configured seed account unless it already exists.
async fn seed_user<U: UserRepository>(
    auth: &AuthService<U>,
    seed: &SeedUser,
) -> Result<(), OrderDeskError> {
    let registered = auth
        .register(RegisterInput {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
        })
        .await;

    match registered {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Seed user created");
            Ok(())
        }
        Err(OrderDeskError::DuplicateEmail) => {
            tracing::debug!("Seed user already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
