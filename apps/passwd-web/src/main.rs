//! passwd-web server binary.

use std::sync::Arc;

use passwd_directory::LdapConnector;
use passwd_web::{logging, router, AppConfig, AppResult, AppState};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "passwd-web terminated");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    let state = AppState::from_config(&config, Arc::new(LdapConnector::new()))?;
    info!(
        version = state.version,
        backends = state.orchestrator.backend_count(),
        "Starting passwd-web {}",
        state.version
    );

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Listening");

    let orchestrator = state.orchestrator.clone();
    axum::serve(listener, router(state, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Passes whose client disconnected may still be rolling back.
    orchestrator.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
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
