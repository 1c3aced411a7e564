#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gatehouse::config::StaticFilesConfig;
use gatehouse::fs::StaticFiles;
use gatehouse::http::connection::ConnectionContext;
use gatehouse::server::AccessLog;
use tempfile::TempDir;

pub const INDEX: &str = "<html><body>home</body></html>";
pub const STYLE: &str = "body { color: red; }";
pub const SCRIPT: &str = "console.log('hi');";

/// A document root with a few files plus a secret next to it.
///
/// Layout:
/// - `<tmp>/site/index.html`, `style.css`, `app.js`, `secret.txt`, `docs/index.html`
/// - `<tmp>/outside.html`, `<tmp>/site-private/leak.html`
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("site");
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::create_dir_all(root.join("empty.html")).unwrap();
        std::fs::write(root.join("index.html"), INDEX).unwrap();
        std::fs::write(root.join("style.css"), STYLE).unwrap();
        std::fs::write(root.join("app.js"), SCRIPT).unwrap();
        std::fs::write(root.join("secret.txt"), "top secret").unwrap();
        std::fs::write(root.join("docs/index.html"), "<p>docs</p>").unwrap();

        std::fs::write(dir.path().join("outside.html"), "<p>outside</p>").unwrap();
        std::fs::create_dir_all(dir.path().join("site-private")).unwrap();
        std::fs::write(dir.path().join("site-private/leak.html"), "<p>leak</p>").unwrap();

        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("site")
    }

    pub fn config(&self) -> StaticFilesConfig {
        StaticFilesConfig {
            root: self.root(),
            ..StaticFilesConfig::default()
        }
    }

    pub fn files(&self) -> StaticFiles {
        StaticFiles::new(self.config()).unwrap()
    }

    pub fn context(&self) -> Arc<ConnectionContext> {
        context_with(self.files(), AccessLog::disabled())
    }

    pub fn write_error_page(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("error.html");
        std::fs::write(&path, contents).unwrap();
        path
    }
}

pub fn context_with(files: StaticFiles, access_log: AccessLog) -> Arc<ConnectionContext> {
    Arc::new(ConnectionContext {
        files,
        access_log,
        read_timeout: Duration::from_secs(2),
        write_timeout: Duration::from_secs(2),
    })
}

/// Splits a raw response into (status line, headers, body).
pub fn split_response(raw: &[u8]) -> (String, Vec<(String, String)>, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = std::str::from_utf8(&raw[..end]).unwrap();
    let body = raw[end + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (k, v) = line.split_once(": ").unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();

    (status, headers, body)
}

