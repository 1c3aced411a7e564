//! Listening socket and process-wide services.
//!
//! - **`listener`**: binds the port and spawns one task per connection
//! - **`access_log`**: single writer for the request log

pub mod access_log;
pub mod listener;

pub use access_log::{AccessLog, AccessRecord};
pub use listener::Server;
