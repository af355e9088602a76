//! Clientdesk server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clientdesk_api::{AppState, app};
use clientdesk_common::{AppResult, Config, config::BootstrapConfig};
use clientdesk_core::AccountService;
use clientdesk_db::entities::user::UserRole;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clientdesk=debug,tower_http=debug".into());

    let json = std::env::var("CLIENTDESK_LOG_FORMAT").is_ok_and(|v| v == "json");
    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

/// Create the configured staff accounts that do not exist yet.
async fn seed_staff(accounts: &AccountService, bootstrap: &BootstrapConfig) -> AppResult<()> {
    let seeds = [
        (
            &bootstrap.admin_username,
            &bootstrap.admin_password,
            &bootstrap.admin_email,
            UserRole::Admin,
        ),
        (
            &bootstrap.accountant_username,
            &bootstrap.accountant_password,
            &bootstrap.accountant_email,
            UserRole::Accountant,
        ),
    ];

    for (username, password, email, role) in seeds {
        match (username, password) {
            (Some(username), Some(password)) => {
                let created = accounts
                    .ensure_staff_account(username, password, email.as_deref(), role)
                    .await?;
                if created {
                    info!(username = %username, ?role, "Seeded staff account");
                }
            }
            (Some(username), None) => {
                warn!(username = %username, ?role, "Staff account configured without a password, skipping");
            }
            _ => {}
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting clientdesk server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = clientdesk_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    clientdesk_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let state = AppState::new(db.clone(), &config.auth);

    seed_staff(&state.account_service, &config.bootstrap).await?;

    // Build router
    let app = app(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Ok(db) = Arc::try_unwrap(db)
        && let Err(e) = db.close().await
    {
        warn!(error = %e, "Failed to close database pool");
    }

    info!("Server shutdown complete");
    Ok(())
}
