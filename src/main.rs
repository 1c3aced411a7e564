use anyhow::Context;
use gatehouse::config::Config;
use gatehouse::server::Server;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load().context("loading configuration")?;
    info!("gatehouse {} starting", env!("CARGO_PKG_VERSION"));

    // Bind before racing the signal so a bad root or busy port exits non-zero
    let server = Server::bind(&cfg).await?;

    tokio::select! {
        res = server.run() => res,
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
