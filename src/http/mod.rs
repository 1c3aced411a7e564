//! HTTP protocol implementation.
//!
//! Just enough HTTP/1.1 to serve one file per connection.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine, owns the socket
//! - **`parser`**: splits and parses the request line
//! - **`request`**: method and request target
//! - **`response`**: status codes and the response builder
//! - **`writer`**: serializes and writes a response to the client
//! - **`mime`**: content type by file extension
//! - **`error_page`**: HTML bodies for 403/404/405
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request line
//!        └──────┬──────┘
//!               │ Request line parsed (anything else → Closed, no response)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Log, resolve path, load file or error page
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod error_page;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
