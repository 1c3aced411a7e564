//! Append-only request log.
//!
//! One task owns the log file. Connections hand it [`AccessRecord`]s over a
//! channel and never touch the file themselves, so lines never interleave.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::http::request::Request;

/// Records buffered before connections start waiting on the writer.
const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub timestamp: DateTime<Local>,
    pub client: SocketAddr,
    pub method: String,
    pub target: String,
}

impl AccessRecord {
    pub fn new(client: SocketAddr, request: &Request) -> Self {
        Self {
            timestamp: Local::now(),
            client,
            method: request.method.to_string(),
            target: request.target.clone(),
        }
    }

    /// `[16/Oct/2026:09:30:00 +0200] 127.0.0.1:51234 GET /index.html`
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}\n",
            self.timestamp.format("[%d/%b/%Y:%H:%M:%S %z]"),
            self.client,
            self.method,
            self.target
        )
    }
}

/// Handle used by connections to submit records. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    tx: Option<mpsc::Sender<AccessRecord>>,
}

impl AccessLog {
    /// A log that drops every record.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Opens `path` for appending (creating it if needed) and starts the
    /// writer task.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("opening access log {}", path.display()))?;
        let (log, _task) = Self::spawn(file);
        Ok(log)
    }

    /// Starts a writer task draining records into `writer`.
    ///
    /// The task ends once every handle has been dropped and the backlog is
    /// written.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(write_records(rx, writer));
        (Self { tx: Some(tx) }, task)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub async fn record(&self, record: AccessRecord) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(record).await.is_err() {
            tracing::warn!("Access log writer has stopped; record dropped");
        }
    }
}

async fn write_records<W>(mut rx: mpsc::Receiver<AccessRecord>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(record) = rx.recv().await {
        let line = record.to_line();
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::warn!("Failed to append to access log: {}", e);
            continue;
        }
        if let Err(e) = writer.flush().await {
            tracing::warn!("Failed to flush access log: {}", e);
        }
    }
}
