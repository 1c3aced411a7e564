//! Gatehouse - minimal static file server
//!
//! Serves files from a single document root over HTTP/1.1, one request per
//! connection, refusing anything that would leave the root.

pub mod config;
pub mod fs;
pub mod http;
pub mod server;
