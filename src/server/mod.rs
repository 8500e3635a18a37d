//! Process-level plumbing: the accept loop, daemonizing, privilege drop and
//! the exit paths.

pub mod daemon;
pub mod listener;
pub mod privilege;

use anyhow::Context;
use nix::sys::signal::{SigHandler, Signal, signal};

/// Fatal startup, configuration or I/O error.
pub const EXIT_FAILURE: i32 = 1;
/// The worker runtime could not be created.
pub const EXIT_SPAWN_FAILURE: i32 = 3;

/// Writes to a closed socket then fail with `BrokenPipe` instead of
/// killing the process.
pub fn ignore_sigpipe() -> anyhow::Result<()> {
    // SAFETY: SigIgn installs no Rust handler.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigIgn) }.context("sigaction() failed")?;
    Ok(())
}

/// Logs `err` and exits the process with `code`.
pub fn fatal(code: i32, err: &anyhow::Error) -> ! {
    tracing::error!("{:#}", err);
    std::process::exit(code)
}

/// Completes on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {}", e);
            let _ = ctrl_c.await;
        }
    }
}
