use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use gatehouse::config::Config;
use tokio::sync::Semaphore;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr(), "0.0.0.0:8080");
    assert_eq!(cfg.server.max_connections, 1024);
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.server.write_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.static_files.root, PathBuf::from("./public"));
    assert_eq!(cfg.static_files.allowed_extensions, vec![".html", ".css", ".js"]);
    assert!(cfg.static_files.error_page.is_none());
    assert!(cfg.logging.access_log.is_none());
}

#[test]
fn test_config_empty_yaml_is_default() {
    let cfg = Config::from_yaml("").unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.static_files.allowed_extensions.len(), 3);
}

#[test]
fn test_config_full_yaml() {
    let yaml = r#"
server:
  host: 127.0.0.1
  port: 9000
  max_connections: 16
  read_timeout_secs: 2
  write_timeout_secs: 5
static_files:
  root: /srv/web
  allowed_extensions: [".html", ".svg"]
  error_page: /srv/error.html
logging:
  access_log: /var/log/gatehouse.log
"#;
    let cfg = Config::from_yaml(yaml).unwrap();

    assert_eq!(cfg.server.listen_addr(), "127.0.0.1:9000");
    assert_eq!(cfg.server.max_connections, 16);
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(2));
    assert_eq!(cfg.static_files.root, PathBuf::from("/srv/web"));
    assert_eq!(cfg.static_files.allowed_extensions, vec![".html", ".svg"]);
    assert_eq!(cfg.static_files.error_page, Some(PathBuf::from("/srv/error.html")));
    assert_eq!(
        cfg.logging.access_log,
        Some(PathBuf::from("/var/log/gatehouse.log"))
    );
}

#[test]
fn test_config_partial_yaml_keeps_other_defaults() {
    let cfg = Config::from_yaml("server:\n  port: 3000\n").unwrap();

    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.static_files.root, PathBuf::from("./public"));
}

#[test]
fn test_config_extensions_are_normalized() {
    let cfg = Config::from_yaml("static_files:\n  allowed_extensions: [HTML, .CSS, js, \"\"]\n").unwrap();

    assert_eq!(cfg.static_files.allowed_extensions, vec![".html", ".css", ".js"]);
    assert!(cfg.static_files.is_allowed(".html"));
    assert!(cfg.static_files.is_allowed(".JS"));
    assert!(!cfg.static_files.is_allowed(".txt"));
    assert!(!cfg.static_files.is_allowed(""));
}

#[test]
fn test_config_invalid_yaml() {
    assert!(Config::from_yaml("server:\n  port: not-a-port\n").is_err());
}

#[test]
fn test_config_env_overrides() {
    let mut cfg = Config::default();
    cfg.apply_overrides(env(&[
        ("GATEHOUSE_HOST", "127.0.0.1"),
        ("GATEHOUSE_PORT", "5000"),
        ("GATEHOUSE_ROOT", "/tmp/site"),
        ("GATEHOUSE_ACCESS_LOG", "/tmp/access.log"),
    ]))
    .unwrap();

    assert_eq!(cfg.server.listen_addr(), "127.0.0.1:5000");
    assert_eq!(cfg.static_files.root, PathBuf::from("/tmp/site"));
    assert_eq!(cfg.logging.access_log, Some(PathBuf::from("/tmp/access.log")));
}

#[test]
fn test_config_no_overrides_leaves_config_alone() {
    let mut cfg = Config::from_yaml("server:\n  port: 4000\n").unwrap();
    cfg.apply_overrides(env(&[])).unwrap();

    assert_eq!(cfg.server.port, 4000);
}

#[test]
fn test_config_bad_port_override() {
    let mut cfg = Config::default();

    assert!(cfg.apply_overrides(env(&[("GATEHOUSE_PORT", "eighty")])).is_err());
    assert!(cfg.apply_overrides(env(&[("GATEHOUSE_PORT", "70000")])).is_err());
}

#[test]
fn test_config_validate() {
    let mut cfg = Config::default();
    assert!(cfg.validate().is_ok());

    cfg.server.max_connections = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.static_files.allowed_extensions.clear();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_validate_connection_limit_upper_bound() {
    let mut cfg = Config::default();

    cfg.server.max_connections = Semaphore::MAX_PERMITS;
    assert!(cfg.validate().is_ok());

    cfg.server.max_connections = Semaphore::MAX_PERMITS + 1;
    assert!(cfg.validate().is_err());

    cfg.server.max_connections = usize::MAX;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_validate_rejects_zero_timeouts() {
    let mut cfg = Config::default();
    cfg.server.read_timeout_secs = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.server.write_timeout_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("gatehouse.yaml");
    std::fs::write(&path, "server:\n  port: 8181\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.server.port, 8181);

    assert!(Config::from_file(&dir.path().join("missing.yaml")).is_err());
}
