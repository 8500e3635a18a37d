use std::ffi::CString;
use std::path::Path;

use anyhow::{Context, anyhow};
use nix::unistd::{Group, User, chdir, chroot, initgroups, setgid, setuid};
use tracing::info;

use crate::config::Confinement;

/// Switches to the configured group and user and chroots into `root`.
///
/// The group is resolved and applied first, then the user is resolved, both
/// while the full filesystem (and its passwd/group databases) is still
/// visible. Only then does the process chroot and give up root. Every
/// failure is returned as-is; callers treat it as fatal.
pub fn drop_privileges(root: &Path, confinement: &Confinement) -> anyhow::Result<()> {
    let group = Group::from_name(&confinement.group)
        .with_context(|| format!("getgrnam({}) failed", confinement.group))?
        .ok_or_else(|| anyhow!("no such group: {}", confinement.group))?;
    setgid(group.gid).context("setgid(2) failed")?;

    let user_name = CString::new(confinement.user.as_str()).context("user name contains a NUL byte")?;
    initgroups(&user_name, group.gid).context("initgroups(2) failed")?;

    let user = User::from_name(&confinement.user)
        .with_context(|| format!("getpwnam({}) failed", confinement.user))?
        .ok_or_else(|| anyhow!("no such user: {}", confinement.user))?;

    chroot(root).with_context(|| format!("chroot(2) to {} failed", root.display()))?;
    chdir("/").context("chdir(2) failed")?;
    setuid(user.uid).context("setuid(2) failed")?;

    info!(user = %confinement.user, group = %confinement.group, root = %root.display(), "confined");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::wait::{WaitStatus, waitpid};
    use nix::unistd::{ForkResult, fork, getgid, getuid};

    #[test]
    fn unknown_group_fails_before_any_change() {
        let confinement = Confinement {
            user: "nobody".to_string(),
            group: "sentinel-no-such-group".to_string(),
        };

        let err = drop_privileges(Path::new("/nonexistent"), &confinement).unwrap_err();
        assert!(err.to_string().contains("no such group"));
    }

    /// Runs `check` in a forked child so credential changes stay out of the
    /// test process. True when the child reports success.
    fn in_child(check: impl FnOnce() -> bool) -> bool {
        // SAFETY: the child only runs `check` and then `_exit`s.
        match unsafe { fork() }.unwrap() {
            ForkResult::Child => {
                let code = if check() { 0 } else { 1 };
                unsafe { libc::_exit(code) }
            }
            ForkResult::Parent { child } => waitpid(child, None).unwrap() == WaitStatus::Exited(child, 0),
        }
    }

    fn nobody() -> (User, Group) {
        let user = User::from_name("nobody").unwrap().expect("nobody user");
        let group = Group::from_gid(user.gid).unwrap().expect("group of nobody");
        (user, group)
    }

    #[test]
    #[ignore = "needs root"]
    fn unknown_user_is_looked_up_after_group_is_applied() {
        let (_, group) = nobody();
        let confinement = Confinement {
            user: "sentinel-no-such-user".to_string(),
            group: group.name.clone(),
        };

        assert!(in_child(|| {
            let failed = drop_privileges(Path::new("/"), &confinement)
                .is_err_and(|err| err.to_string().contains("no such user"));
            failed && getgid() == group.gid && getuid().is_root()
        }));
    }

    #[test]
    #[ignore = "needs root"]
    fn chroot_failure_stops_before_setuid() {
        let (user, group) = nobody();
        let confinement = Confinement {
            user: user.name.clone(),
            group: group.name.clone(),
        };

        assert!(in_child(|| {
            let failed = drop_privileges(Path::new("/nonexistent/sentinel-root"), &confinement)
                .is_err_and(|err| err.to_string().contains("chroot"));
            failed && getgid() == group.gid && getuid().is_root()
        }));
    }
}
