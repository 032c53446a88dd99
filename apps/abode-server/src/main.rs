mod config;
mod error;
mod evidence;
mod geocode;
mod handlers;
mod objects;
mod server;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use abode_events::EventBus;
use abode_events_memory::MemoryEventBus;
use abode_store_sqlite::SqliteStore;
use abode_storage::Store;

use config::ServerConfig;
use geocode::{create_geocoder, Geocoder};
use objects::{create_object_store, ObjectStore};
use server::AbodeServer;

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "abode-server")]
#[command(about = "Abode address verification server")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,

        /// Health check server address
        #[arg(long, default_value = "0.0.0.0:8081")]
        health_addr: String,
    },
}

// ────────────────────────────────────── Serve ──────────────────────────────────────

async fn cmd_serve(
    database_url: Option<String>,
    addr: &str,
    health_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use axum::{routing::get, Router};

    let addr: std::net::SocketAddr = addr.parse()?;
    let health_addr: std::net::SocketAddr = health_addr.parse()?;

    let config = ServerConfig::from_env()?;
    let db_url = database_url.unwrap_or_else(|| "sqlite://abode.db?mode=rwc".to_string());

    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_url).await?);
    let events: Arc<dyn EventBus> = Arc::new(MemoryEventBus::new());
    let geocoder: Option<Arc<dyn Geocoder>> =
        create_geocoder(&config.geocoder)?.map(|g| Arc::from(g));
    let objects: Arc<dyn ObjectStore> = Arc::from(create_object_store(&config.evidence));

    let server = Arc::new(AbodeServer::new(store, events, config, geocoder, objects));
    let app = handlers::router(server);

    // Create a channel for readiness probe signaling
    let (readiness_tx, readiness_rx) = tokio::sync::watch::channel(false);
    let readiness_check = ReadinessCheck::new(readiness_rx);

    // HTTP health check server for Kubernetes liveness/readiness probes
    // /healthz - simple liveness check (always returns ok)
    // /readyz - readiness check (returns ok once the API listener is bound)
    let health_router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/readyz", get(readiness_handler))
        .with_state(readiness_check);

    // Bind listeners to get actual addresses
    let api_listener = tokio::net::TcpListener::bind(addr).await?;
    let api_actual_addr = api_listener.local_addr()?;

    let health_listener = tokio::net::TcpListener::bind(health_addr).await?;
    let health_actual_addr = health_listener.local_addr()?;

    info!("AbodeServer listening on {}", api_actual_addr);
    info!("Health checks listening on {}", health_actual_addr);

    let _ = readiness_tx.send(true);

    // Create a broadcast channel for shutdown signaling
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);
    let shutdown_tx_clone = shutdown_tx.clone();

    tokio::spawn(async move {
        shutdown_signal(Some(readiness_tx)).await;
        let _ = shutdown_tx_clone.send(());
    });

    let mut shutdown_rx1 = shutdown_tx.subscribe();
    let health_server =
        axum::serve(health_listener, health_router).with_graceful_shutdown(async move {
            let _ = shutdown_rx1.recv().await;
        });

    let mut shutdown_rx2 = shutdown_tx.subscribe();
    let api_server = axum::serve(api_listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx2.recv().await;
    });

    // Run both servers concurrently - ensure both complete their shutdown sequences
    let (api_result, health_result) = tokio::join!(api_server, health_server);

    api_result?;
    health_result?;

    Ok(())
}

#[derive(Clone)]
struct ReadinessCheck {
    ready: tokio::sync::watch::Receiver<bool>,
}

impl ReadinessCheck {
    fn new(ready: tokio::sync::watch::Receiver<bool>) -> Self {
        Self { ready }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn readiness_handler(
    axum::extract::State(check): axum::extract::State<ReadinessCheck>,
) -> Result<&'static str, axum::http::StatusCode> {
    if *check.ready.borrow() {
        Ok("ok")
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn shutdown_signal(readiness_tx: Option<tokio::sync::watch::Sender<bool>>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }

    // Mark not ready on shutdown for clean traffic drain in Kubernetes
    if let Some(tx) = readiness_tx {
        let _ = tx.send(false);
    }
}

// ────────────────────────────────────── Main ──────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr, health_addr } => {
            cmd_serve(cli.database_url, &addr, &health_addr).await
        }
    }
}
