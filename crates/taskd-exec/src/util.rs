//! Process plumbing: shell command construction and process-group termination.
//!
//! On Unix every task runs as the leader of a fresh session (`setsid` in a
//! `pre_exec` hook), so the shell and everything it forks share one process
//! group whose id is the shell's pid. Killing `-pgid` then reaches the whole tree.
use std::path::Path;

use tokio::process::Command;

cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        /// Interpreter used when none is configured.
        pub const DEFAULT_SHELL: &str = "cmd";
        const SCRIPT_FLAG: &str = "/C";
    } else {
        /// Interpreter used when none is configured.
        pub const DEFAULT_SHELL: &str = "/bin/sh";
        const SCRIPT_FLAG: &str = "-c";
    }
}

/// Build `<shell> -c <script>` (`cmd /C <script>` on Windows).
pub fn shell_command(shell: &Path, script: &str) -> Command {
    let mut cmd = Command::new(shell);
    cmd.arg(SCRIPT_FLAG).arg(script);
    cmd
}

/// Make the spawned process the leader of a new session and process group.
#[cfg(unix)]
pub fn new_session(cmd: &mut Command) {
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub fn new_session(_cmd: &mut Command) {}

/// Send `SIGKILL` to every process in group `pgid`.
///
/// A group that no longer exists is not an error.
#[cfg(unix)]
pub fn kill_group(pgid: u32) -> std::io::Result<()> {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return Err(std::io::Error::from(std::io::ErrorKind::InvalidInput));
    };
    if pgid <= 1 {
        return Err(std::io::Error::from(std::io::ErrorKind::InvalidInput));
    }

    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
pub fn kill_group(_pgid: u32) -> std::io::Result<()> {
    tracing::warn!(target: "taskd.exec.util", "process groups are not supported on this platform; only the leaf process is killed");
    Ok(())
}

/// Kills the process group when dropped, unless disarmed.
///
/// Covers the case where the execution future is dropped mid-flight.
pub(crate) struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    pub(crate) fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// The group is gone or already handled; don't signal it again.
    pub(crate) fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            let _ = kill_group(pgid);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_signal_init_or_everything() {
        assert!(kill_group(0).is_err());
        assert!(kill_group(1).is_err());
        assert!(kill_group(u32::MAX).is_err());
    }

    #[tokio::test]
    async fn killing_a_finished_group_is_ok() {
        let mut cmd = shell_command(Path::new(DEFAULT_SHELL), "exit 0");
        new_session(&mut cmd);
        let mut child = cmd.spawn().unwrap();
        let pid = child.id().unwrap();
        child.wait().await.unwrap();

        assert!(kill_group(pid).is_ok());
    }

    #[tokio::test]
    async fn kill_group_terminates_the_leader() {
        let mut cmd = shell_command(Path::new(DEFAULT_SHELL), "sleep 30");
        new_session(&mut cmd);
        let mut child = cmd.spawn().unwrap();
        let pid = child.id().unwrap();

        kill_group(pid).unwrap();
        let status = tokio::time::timeout(std::time::Duration::from_secs(2), child.wait())
            .await
            .expect("killed process should be reaped")
            .unwrap();
        assert!(!status.success());
    }
}
