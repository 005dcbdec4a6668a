use anyhow::Context;
use clap::Parser; // for cli
use jokes_gateway::config::Args;
use jokes_gateway::rate_limit::{RateLimiter, run_sweeper};
use jokes_gateway::state::AppState;
use jokes_gateway::store::{JokeStore, MemoryJokeStore, PgJokeStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();

    let store: Arc<dyn JokeStore> = match &args.database_url {
        Some(db_url) => {
            let store = PgJokeStore::connect(db_url, args.query_timeout())
                .await
                .context("failed to connect to the jokes database")?;
            store
                .migrate()
                .await
                .context("failed to create the jokes table")?;
            info!("Connected to jokes database");
            Arc::new(store)
        }
        None => {
            warn!("No database configured, jokes are kept in memory");
            Arc::new(MemoryJokeStore::new())
        }
    };

    let rate_config = args.rate_limit_config();
    let rate_limiter = Arc::new(RateLimiter::new(rate_config));

    // spawn the visitor sweeper, stopped once the server has drained
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let sweeper = tokio::spawn(run_sweeper(Arc::clone(&rate_limiter), async move {
        let _ = stop_rx.await;
    }));

    let state = Arc::new(AppState::new(store, rate_limiter));
    let app = jokes_gateway::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Jokes gateway listening on http://{}", addr);
    info!(
        "Write rate limit: burst of {} then {} per second per client",
        rate_config.burst, rate_config.per_second
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = stop_tx.send(());
    sweeper.await?;
    info!("Jokes gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
