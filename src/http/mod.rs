//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.x server: one request per connection, files
//! from a document root, `Connection: close` on every response.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection worker driving the state machine below
//! - **`reader`**: reads one request off a buffered stream
//! - **`parser`**: request line, header line and `Content-Length` parsing
//! - **`request`**: HTTP request representation
//! - **`handler`**: method dispatch and file lookup
//! - **`static_files`**: maps request paths onto the document root
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: serializes the header block and streams the body
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Request line, headers, body
//!        └──────┬──────┘
//!               │ Request parsed (parse errors end the worker here)
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← 200 / 404 / 405 / 501
//!        └──────┬───────────┘
//!               │ Response flushed
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sentinel_httpd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//! loop {
//!     let (socket, peer) = listener.accept().await?;
//!     let config = Arc::clone(&config);
//!     tokio::spawn(async move {
//!         if let Err(e) = Connection::new(socket, peer, config).run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     });
//! }
//! ```

pub mod connection;
pub mod handler;
pub mod mime;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod static_files;
pub mod writer;
