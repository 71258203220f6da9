use anyhow::Result;
use qr_attendance::{build_router, create_state, spawn_session_sweeper, AppConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let app_state = create_state(&config)?;

    let sweeper = spawn_session_sweeper(
        app_state.clone(),
        config.sessions.idle_ttl,
        config.sessions.sweep_interval,
    )?;

    let app = build_router(app_state, &config.server);

    info!("Starting at endpoint:{}", config.server.bind_addr);
    info!("Starting QR Attendance API server v{}...", env!("CARGO_PKG_VERSION"));
    info!(
        "Tokens live {}ms, presenters rotate every {}ms",
        config.token.ttl.as_millis(),
        config.token.rotation_interval.as_millis()
    );

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped; in-memory state discarded");

    Ok(())
}

async fn shutdown_signal() {
    // ---
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
