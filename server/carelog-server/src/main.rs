use clap::Parser;
use std::env;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carelog_server::{config::ServerConfig, create_app, CarelogServer};
use error_common::{CarelogError, Result};

/// Carelog Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "carelog-server")]
#[command(about = "Clinical record-keeping HTTP API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    info!("Starting Carelog Engine HTTP Server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;

    let server = CarelogServer::new(config)
        .await
        .map_err(|e| CarelogError::ServerError(format!("Server initialization failed: {e}")))?;

    // Re-arm scheduled messages that were pending when the process last stopped
    let armed = server
        .scheduler
        .start()
        .await
        .map_err(|e| CarelogError::ServerError(format!("Scheduler start failed: {e}")))?;
    info!("Message scheduler armed {} pending jobs", armed);

    let scheduler = server.scheduler.clone();
    let app = create_app(server);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CarelogError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!("Carelog Engine server running on http://{}", addr);
    info!("Health check available at: http://{}/health", addr);
    info!("API v1 available at: http://{}/api/v1", addr);
    info!("API docs available at: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CarelogError::ServerError(format!("HTTP server error: {e}")))?;

    // Stop delivery tasks cleanly; pending rows re-arm on next start
    scheduler.shutdown().await;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("carelog_server={default_level},tower_http=info,sqlx=warn").into()
    });

    let is_development =
        env::var("CARELOG_ENV").unwrap_or_else(|_| "production".to_string()) == "development";

    if is_development {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .json(),
            )
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
