use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod startup;

use crate::config::Config;
use crate::domain::TrophyRepository;
use crate::errors::AppError;
use crate::repositories::DynamoDbTrophyRepository;

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub config: Config,
    pub trophy_repo: Arc<dyn TrophyRepository>,
    /// Rate limit tracking: client key -> (count, window_start)
    rate_limiter: DashMap<String, (u32, Instant)>,
}

impl AppState {
    pub fn new(config: Config, trophy_repo: Arc<dyn TrophyRepository>) -> Self {
        Self {
            config,
            trophy_repo,
            rate_limiter: DashMap::new(),
        }
    }

    /// Fixed-window rate limit check for a client key.
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = Instant::now();
        let window = self.config.rate_limit_window();
        let limit = self.config.rate_limit_max_requests;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "trophy_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing configuration is fatal; log and exit rather than start degraded.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        bind_address = %config.bind_address,
        table_name = %config.trophies_table_name,
        allowed_origins = ?config.allowed_origins,
        rate_limit_max_requests = config.rate_limit_max_requests,
        rate_limit_window_secs = config.rate_limit_window_secs,
        max_body_size_mb = config.max_body_size_mb,
        "Loaded configuration"
    );

    let sdk_config = aws_clients::create_sdk_config(&config).await?;
    let db_client = aws_clients::create_dynamodb_client(&sdk_config);

    // The table check doubles as the connect-or-die startup probe.
    if let Err(e) = startup::ensure_trophies_table(&db_client, &config.trophies_table_name).await {
        tracing::error!(error = %e, "Failed to reach the trophy store, exiting");
        std::process::exit(1);
    }

    let trophy_repo: Arc<dyn TrophyRepository> = Arc::new(DynamoDbTrophyRepository::new(
        db_client,
        config.trophies_table_name.clone(),
    ));

    let bind_address = config.bind_address;
    let state = Arc::new(AppState::new(config, trophy_repo));
    let app = routes::create_router(state);

    tracing::info!("Server listening on http://{}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(
        listener,
        // ConnectInfo feeds the rate limiter's client fallback key
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
