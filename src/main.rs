use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use tweeters_stats::{AppState, Config, TwitterClient, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Configuration decides the log format, so it is loaded first and any
    // error is reported once logging is up
    let config = Config::from_env();
    utils::init_tracing(config.as_ref().is_ok_and(|c| c.log_json));

    info!(
        "Starting Tweeters Stats v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return ExitCode::from(exitcode::CONFIG as u8);
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run(config: Config) -> Result<(), exitcode::ExitCode> {
    info!(
        host = %config.host,
        protocol = %config.protocol,
        port = %config.port,
        homepage = %config.homepage,
        timeline_count = config.timeline_count,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "Configuration loaded"
    );

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    let twitter = Arc::new(TwitterClient::new(&config).map_err(|e| {
        error!("Failed to build Twitter client: {e}");
        exitcode::SOFTWARE
    })?);

    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;

    let state = AppState::new(config, twitter.clone(), twitter);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("Endpoints:");
    info!("  GET    /                        - Homepage");
    info!("  GET    /health                  - Health check");
    info!("  GET    /login/twitter           - Start Twitter login");
    info!("  GET    /oauth/twitter/callback  - Twitter OAuth callback");
    info!("  DELETE /logout                  - Clear session cookies");
    info!("  GET    /tweeters-stats          - Per-author timeline stats");

    // ConnectInfo feeds the client address into the access log
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(utils::shutdown_signal())
    .await
    .map_err(|e| {
        error!("Server error: {e}");
        exitcode::SOFTWARE
    })?;

    info!("Server shutdown complete");
    Ok(())
}
