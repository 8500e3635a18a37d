use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::config::Config;
use crate::http::handler;
use crate::http::reader::read_request;
use crate::http::request::Request;

/// One worker: reads a single request, answers it, closes the connection.
pub struct Connection<S = TcpStream> {
    stream: BufReader<S>,
    peer: SocketAddr,
    config: Arc<Config>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Responding(Request),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, config: Arc<Config>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer,
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to `Closed`. Errors end the worker; nothing is
    /// sent for a request that failed to parse.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let request = read_request(&mut self.stream, self.config.max_body_length).await?;
                    self.state = ConnectionState::Responding(request);
                }

                ConnectionState::Responding(request) => {
                    let status =
                        handler::respond(&request, &self.config.document_root, &mut self.stream).await?;
                    info!(
                        peer = %self.peer,
                        method = %request.method,
                        path = %request.path,
                        status = status.as_u16(),
                        "request served"
                    );
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "shutdown after response failed");
        }
        Ok(())
    }
}

/// True if the peer went away while we were writing to it.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| matches!(e.kind(), io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset))
    })
}
