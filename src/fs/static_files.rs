//! Turns a parsed request into a response from the document root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::StaticFilesConfig;
use crate::fs::resolver::{self, ResolvedPath};
use crate::http::error_page;
use crate::http::mime::mime_for;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Serves files from a canonical document root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    config: StaticFilesConfig,
}

impl StaticFiles {
    /// Canonicalizes the configured root. Fails if it does not exist.
    pub fn new(config: StaticFilesConfig) -> anyhow::Result<Self> {
        let root = std::fs::canonicalize(&config.root)
            .with_context(|| format!("document root {} is not accessible", config.root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("document root {} is not a directory", root.display());
        }
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produces the response for `request`.
    ///
    /// Every rejection becomes an error page. Only unexpected I/O failures
    /// are returned as `Err`; the caller drops the connection for those.
    pub async fn respond(&self, request: &Request) -> anyhow::Result<Response> {
        if !request.is_get() {
            debug!("Rejecting method {}", request.method);
            return Ok(self.error(StatusCode::MethodNotAllowed).await);
        }

        let resolved = match resolver::resolve(&request.target, &self.root) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Rejected target {:?}: {}", request.target, e);
                return Ok(self.error(StatusCode::Forbidden).await);
            }
        };

        if !self.config.is_allowed(&resolved.extension) {
            warn!(
                "Rejected target {:?}: extension {:?} not allowed",
                request.target, resolved.extension
            );
            return Ok(self.error(StatusCode::Forbidden).await);
        }

        self.serve(&resolved).await
    }

    async fn serve(&self, resolved: &ResolvedPath) -> anyhow::Result<Response> {
        let path = &resolved.absolute_path;

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(self.error(StatusCode::NotFound).await),
            Err(e) if is_missing(&e) => return Ok(self.error(StatusCode::NotFound).await),
            Err(e) => return Err(e).with_context(|| format!("stat {}", path.display())),
        };

        // A symlink below the root may still point outside of it
        let canonical = tokio::fs::canonicalize(path)
            .await
            .with_context(|| format!("canonicalize {}", path.display()))?;
        if !canonical.starts_with(&self.root) {
            warn!("Symlink {} leaves the document root", path.display());
            return Ok(self.error(StatusCode::Forbidden).await);
        }

        let body = match tokio::fs::read(&canonical).await {
            Ok(body) => body,
            Err(e) if is_missing(&e) => return Ok(self.error(StatusCode::NotFound).await),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        debug!("Serving {} ({} bytes)", path.display(), metadata.len());

        Ok(Response::ok(mime_for(&resolved.extension), body))
    }

    async fn error(&self, status: StatusCode) -> Response {
        error_page::error_response(status, self.config.error_page.as_deref()).await
    }
}

fn is_missing(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
