//! Error taxonomy for the request/response cycle.
//!
//! Parse failures never turn into HTTP replies: the worker that hits one logs
//! it and closes the connection.

use std::io;
use thiserror::Error;

/// The request bytes do not form a request this server understands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("no request line")]
    MissingRequestLine,

    #[error("parse error on request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("request path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("unsupported protocol identifier: {0:?}")]
    InvalidProtocol(String),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("header block ended before the blank line")]
    UnterminatedHeader,

    #[error("parse error on request header field: {0:?}")]
    MalformedHeader(String),

    #[error("negative Content-Length value")]
    NegativeContentLength,

    #[error("invalid Content-Length value: {0:?}")]
    InvalidContentLength(String),
}

/// The request body could not be taken off the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("request body too long: {length} bytes (limit {limit})")]
    TooLarge { length: u64, limit: u64 },

    #[error("failed to read request body: expected {expected} bytes, got {received}")]
    Truncated { expected: u64, received: u64 },
}

/// Anything that stops a worker from producing a `Request`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("i/o error while reading request: {0}")]
    Io(#[from] io::Error),
}

impl RequestError {
    /// True when the peer hung up before sending a single byte.
    pub fn is_empty_connection(&self) -> bool {
        matches!(self, RequestError::Protocol(ProtocolError::MissingRequestLine))
    }
}
