use day_dashboard::remote::RemoteClient;
use day_dashboard::{load_completions, router, sync, ticker, AppState, Config};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let completions = load_completions(&config.data_path).await;
    let remote = match &config.remote_url {
        Some(url) => Some(RemoteClient::new(url.clone(), config.remote_timeout)?),
        None => None,
    };
    let port = config.port;
    let state = AppState::new(config, remote, completions);

    match &state.remote {
        Some(remote) => info!(endpoint = remote.endpoint(), "using remote schedule"),
        None => info!("no remote endpoint configured, using the built-in timetable"),
    }

    if let Err(err) = sync::refresh_schedule(&state).await {
        warn!("initial schedule load failed: {err}");
    }

    ticker::spawn_minute_ticker(state.clone());
    if state.remote.is_some() {
        ticker::spawn_schedule_refresher(state.clone());
        if let Err(err) = sync::refresh_ledger(&state).await {
            warn!("initial ledger load failed: {err}");
        }
        ticker::spawn_ledger_refresher(state.clone());
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
