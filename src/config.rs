//! Server configuration.
//!
//! Configuration is read once at startup from an optional YAML file, then
//! overridden by `GATEHOUSE_*` environment variables. Every field has a
//! default, so an empty file (or no file at all) yields a working server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tokio::sync::Semaphore;

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "gatehouse.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,
    /// Port to bind to; `0` asks the OS for an ephemeral port
    pub port: u16,
    /// Maximum number of connections handled concurrently
    pub max_connections: usize,
    /// Time allowed for a client to send its request line
    pub read_timeout_secs: u64,
    /// Time allowed for writing a full response
    pub write_timeout_secs: u64,
}

/// Document root and what may be served from it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    /// Lower-cased extensions with their leading dot (".html")
    pub allowed_extensions: Vec<String>,
    /// Optional HTML template used for every error response
    pub error_page: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only request log; disabled when unset
    pub access_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 1024,
            read_timeout_secs: 10,
            write_timeout_secs: 30,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public"),
            allowed_extensions: vec![".html".into(), ".css".into(), ".js".into()],
            error_page: None,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl StaticFilesConfig {
    /// Whether `extension` (as produced by the path resolver) is servable.
    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl Config {
    /// Loads configuration for the server binary.
    ///
    /// The file is taken from the first CLI argument, then `GATEHOUSE_CONFIG`,
    /// then `gatehouse.yaml` if it exists. Environment overrides are applied
    /// last.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("GATEHOUSE_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            });

        let mut cfg = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document, which we treat as "all defaults"
        let mut cfg: Config = if raw.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        cfg.static_files.allowed_extensions = cfg
            .static_files
            .allowed_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| ext.len() > 1)
            .collect();
        Ok(cfg)
    }

    /// Applies `GATEHOUSE_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GATEHOUSE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GATEHOUSE_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("GATEHOUSE_PORT is not a valid port: {port:?}"))?;
        }
        if let Some(root) = lookup("GATEHOUSE_ROOT") {
            self.static_files.root = PathBuf::from(root);
        }
        if let Some(log) = lookup("GATEHOUSE_ACCESS_LOG") {
            self.logging.access_log = Some(PathBuf::from(log));
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_connections == 0 {
            anyhow::bail!("server.max_connections must be at least 1");
        }
        if self.server.max_connections > Semaphore::MAX_PERMITS {
            anyhow::bail!(
                "server.max_connections must not exceed {}",
                Semaphore::MAX_PERMITS
            );
        }
        if self.server.read_timeout_secs == 0 {
            anyhow::bail!("server.read_timeout_secs must be at least 1");
        }
        if self.server.write_timeout_secs == 0 {
            anyhow::bail!("server.write_timeout_secs must be at least 1");
        }
        if self.static_files.allowed_extensions.is_empty() {
            anyhow::bail!("static_files.allowed_extensions must not be empty");
        }
        Ok(())
    }
}

/// Lower-cases `ext` and makes sure it starts with a dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
