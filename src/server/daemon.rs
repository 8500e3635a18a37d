use std::fs::OpenOptions;
use std::os::fd::AsRawFd;

use anyhow::Context;
use nix::unistd::{ForkResult, chdir, dup2, fork, setsid};

const PATH_DEVNULL: &str = "/dev/null";

/// Detaches from the controlling terminal.
///
/// Changes directory to `/`, points stdin, stdout and stderr at `/dev/null`,
/// forks (the parent exits with status 0) and starts a new session in the
/// child. Must run before any threads are started.
pub fn detach() -> anyhow::Result<()> {
    chdir("/").context("chdir(2) failed")?;

    let null = OpenOptions::new()
        .read(true)
        .write(true)
        .open(PATH_DEVNULL)
        .with_context(|| format!("failed to open {}", PATH_DEVNULL))?;
    for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        dup2(null.as_raw_fd(), fd).with_context(|| format!("failed to redirect fd {} to {}", fd, PATH_DEVNULL))?;
    }
    drop(null);

    // SAFETY: single-threaded at this point; the parent only calls _exit.
    match unsafe { fork() }.context("fork(2) failed")? {
        ForkResult::Parent { .. } => unsafe { libc::_exit(0) },
        ForkResult::Child => {}
    }

    setsid().context("setsid(2) failed")?;
    Ok(())
}
