//! medipass Accounts API service
//!
//! Wires the three directory stores together: the identity provider's
//! HTTP API for credentials, and Postgres for role bindings and
//! clinical profile records.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use config::Config;
use medipass_api_accounts::{accounts_router, openapi_routes, AccountsState};
use medipass_identity_rest::{RestIdentityConfig, RestIdentityStore};
use medipass_pg::{PgProfileStore, PgRoleBindingStore, MIGRATOR};
use medipass_provisioning::DirectorySettings;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        domain = %config.account_domain,
        "Starting accounts API"
    );

    // Identity store over the identity provider's HTTP API
    let rest_config = RestIdentityConfig::new(
        config.identity_base_url.clone(),
        config.identity_service_token.clone(),
    );
    let identities = match RestIdentityStore::new(rest_config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to build identity store client: {e}");
            std::process::exit(1);
        }
    };

    // Binding and profile stores over Postgres
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = MIGRATOR.run(&pool).await {
            eprintln!("FATAL: Migration failed: {e}");
            std::process::exit(1);
        }
        info!("Migrations applied");
    }

    let bindings = Arc::new(PgRoleBindingStore::new(pool.clone()));
    let profiles = Arc::new(PgProfileStore::new(pool));

    let settings = DirectorySettings::new(
        &config.account_domain,
        &config.bootstrap_address,
        &config.default_specialty,
    );
    let state = AccountsState::new(identities, bindings, profiles, settings);

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(openapi_routes())
        .merge(accounts_router(state))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
