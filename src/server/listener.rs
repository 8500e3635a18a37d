use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::RequestError;
use crate::http::connection::{Connection, is_broken_pipe};

/// Pause after the process ran out of descriptors before accepting again.
const EXHAUSTED_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the listening socket. Runs before any privilege drop so that
/// ports below 1024 stay usable.
pub fn bind(cfg: &Config) -> anyhow::Result<std::net::TcpListener> {
    let listener = std::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
        .with_context(|| format!("failed to listen on {}", cfg.listen_addr()))?;
    listener
        .set_nonblocking(true)
        .context("failed to make listening socket non-blocking")?;
    Ok(listener)
}

/// Hands a socket from [`bind`] to the runtime and serves it.
pub async fn run(listener: std::net::TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    let listener = TcpListener::from_std(listener).context("failed to register listening socket")?;
    serve(listener, cfg).await
}

/// The accept loop. Each connection is moved into its own task, which reads
/// one request, answers it and exits.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) if is_transient(&e) => {
                debug!("accept(2) interrupted: {}", e);
                continue;
            }
            Err(e) if is_exhausted(&e) => {
                warn!("accept(2) failed, retrying: {}", e);
                tokio::time::sleep(EXHAUSTED_BACKOFF).await;
                continue;
            }
            Err(e) => return Err(e).context("accept(2) failed"),
        };
        debug!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        tokio::spawn(async move {
            let conn = Connection::new(socket, peer, cfg);
            match conn.run().await {
                Ok(()) => {}
                Err(e) if is_broken_pipe(&e) => {
                    debug!("Peer {} closed the connection: {}", peer, e);
                }
                Err(e) if e.downcast_ref::<RequestError>().is_some_and(RequestError::is_empty_connection) => {
                    debug!("Peer {} sent nothing", peer);
                }
                Err(e) => {
                    error!("Connection error from {}: {:#}", peer, e);
                }
            }
        });
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

fn is_exhausted(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EMFILE) | Some(libc::ENFILE))
}
