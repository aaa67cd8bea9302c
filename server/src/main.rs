#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics at startup.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use authd::api::{AppState, router};
use authd::auth::{Argon2Hasher, JwtConfig, TokenService};
use authd::config::{ServerConfig, StorageBackend};
use authd::flows::AccountService;
use authd::storage::{FileUserStore, MemoryUserStore, UserStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authd=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: storage={:?}, data_directory={}, listen_port={}, route_prefix='{}', token_ttl={}s",
        config.storage,
        config.data_directory.display(),
        config.listen_port,
        config.route_prefix,
        config.token_ttl.as_secs()
    );

    let store = open_store(&config);

    let secret = config.jwt_secret.as_bytes().to_vec();
    let jwt_config = match JwtConfig::new_hs256(secret, config.token_ttl) {
        Ok(jwt_config) => jwt_config,
        Err(e) => {
            tracing::error!("Invalid token configuration: {e}");
            std::process::exit(1);
        }
    };

    let accounts = AccountService::new(
        store,
        Arc::new(Argon2Hasher::new()),
        Arc::new(TokenService::new(&jwt_config)),
    );
    let app = router(AppState::new(accounts), &config.route_prefix);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });
}

/// Build the configured user store. Any failure here is fatal.
fn open_store(config: &ServerConfig) -> Arc<dyn UserStore> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory user store; registrations are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
        StorageBackend::File => {
            // Pre-condition: config.data_directory is a valid path.
            // Post-condition: The directory exists and is accessible.
            if let Err(e) = std::fs::create_dir_all(&config.data_directory) {
                tracing::error!("Failed to create data directory: {e}");
                std::process::exit(1);
            }
            match FileUserStore::open(&config.data_directory) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("Failed to open user store: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        // Keep serving; without a signal handler the process is stopped externally.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
