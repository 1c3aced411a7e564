use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;
use tracing::debug;

use crate::fs::StaticFiles;
use crate::http::parser::{ParseError, parse_request_line, take_request_line};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::server::access_log::{AccessLog, AccessRecord};

/// Everything a connection needs besides its socket. Shared read-only by
/// all connections.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub files: StaticFiles,
    pub access_log: AccessLog,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

/// A single client connection serving exactly one request.
///
/// The stream is owned here and released when the connection is dropped,
/// whichever way [`Connection::run`] returns.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    buffer: BytesMut,
    state: ConnectionState,
    ctx: Arc<ConnectionContext>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, ctx: Arc<ConnectionContext>) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(1024),
            state: ConnectionState::Reading,
            ctx,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    let read = timeout(self.ctx.read_timeout, self.read_request()).await;
                    match read {
                        Ok(Some(req)) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        Ok(None) => {
                            self.state = ConnectionState::Closed;
                        }
                        Err(_) => {
                            debug!("Timed out waiting for request line from {}", self.peer);
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let log = &self.ctx.access_log;
                    if log.is_enabled() {
                        log.record(AccessRecord::new(self.peer, req)).await;
                    }

                    let response = self.ctx.files.respond(req).await?;
                    debug!(
                        "{} {} {} -> {}",
                        self.peer,
                        req.method,
                        req.target,
                        response.status.as_u16()
                    );

                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    timeout(self.ctx.write_timeout, writer.write_to_stream(&mut self.stream))
                        .await
                        .context("timed out writing response")??;

                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the first line is complete.
    ///
    /// Returns `None` when there is nothing to answer: the client closed the
    /// connection early or sent something that is not a request line.
    pub async fn read_request(&mut self) -> Option<Request> {
        loop {
            // Try parsing whatever we already have
            match take_request_line(&self.buffer) {
                Ok(line) => return parse_line(line, self.peer),
                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }
                Err(e) => {
                    debug!("Dropping connection from {}: {}", self.peer, e);
                    return None;
                }
            }

            match self.stream.read_buf(&mut self.buffer).await {
                Ok(0) if self.buffer.is_empty() => return None,
                // Client closed mid-line: take what we have as the line
                Ok(0) => return parse_line(&self.buffer, self.peer),
                Ok(_) => {}
                Err(e) => {
                    debug!("Read from {} failed: {}", self.peer, e);
                    return None;
                }
            }
        }
    }
}

fn parse_line(line: &[u8], peer: SocketAddr) -> Option<Request> {
    match parse_request_line(line) {
        Ok(req) => Some(req),
        Err(e) => {
            debug!("Dropping connection from {}: {}", peer, e);
            None
        }
    }
}
