//! Sentinel httpd - minimal HTTP/1.x static file server
//!
//! One request per connection, one task per connection, files served from a
//! document root with optional chroot and privilege drop at startup.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
