use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::fs::StaticFiles;
use crate::http::connection::{Connection, ConnectionContext};
use crate::server::access_log::AccessLog;

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listener plus the state shared by its connections.
pub struct Server {
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    limit: Arc<Semaphore>,
}

impl Server {
    /// Validates `cfg`, prepares the document root and access log, then
    /// binds the socket.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        cfg.validate()?;
        let files = StaticFiles::new(cfg.static_files.clone())?;

        let access_log = match &cfg.logging.access_log {
            Some(path) => match AccessLog::open(path).await {
                Ok(log) => log,
                Err(e) => {
                    warn!("Access log disabled: {:#}", e);
                    AccessLog::disabled()
                }
            },
            None => AccessLog::disabled(),
        };

        let addr = cfg.server.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {addr}"))?;

        info!("Serving {} on {}", files.root().display(), listener.local_addr()?);
        info!(
            "Allowed extensions: {}",
            cfg.static_files.allowed_extensions.join(", ")
        );

        let ctx = ConnectionContext {
            files,
            access_log,
            read_timeout: cfg.server.read_timeout(),
            write_timeout: cfg.server.write_timeout(),
        };

        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
            limit: Arc::new(Semaphore::new(cfg.server.max_connections)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the task is cancelled.
    ///
    /// Each connection runs on its own task. Once `max_connections` are in
    /// flight the loop waits for one to finish before accepting again.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let permit = self.limit.clone().acquire_owned().await?;

            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let ctx = self.ctx.clone();
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, peer, ctx);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {:#}", peer, e);
                }
                drop(permit);
            });
        }
    }
}
