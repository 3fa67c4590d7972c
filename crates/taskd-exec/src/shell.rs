use std::{
    path::PathBuf,
    process::{ExitStatus, Stdio},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, trace, warn};

use taskd_model::Task;

use crate::{
    error::ExecError,
    outcome::{ExecOutcome, FailureKind},
    util::{DEFAULT_SHELL, GroupGuard, kill_group, new_session, shell_command},
};

/// Bound on the wait after a kill: reaping the child and draining its pipes.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(200);

#[derive(Clone, Debug)]
pub struct ExecConfig {
    /// Interpreter that receives the task command via `-c`.
    pub shell: PathBuf,
    /// Extra environment for every task.
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// How long to wait for cleanup once the deadline has fired.
    pub grace: Duration,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            env: Vec::new(),
            cwd: None,
            grace: DEFAULT_GRACE,
        }
    }
}

/// Runs task commands through a shell with a hard deadline.
///
/// Each call owns its child and buffers; the executor itself is stateless and can be shared.
#[derive(Clone, Debug, Default)]
pub struct ShellExecutor {
    cfg: ExecConfig,
}

impl ShellExecutor {
    pub fn new(cfg: ExecConfig) -> Self {
        Self { cfg }
    }

    /// Run `task` and classify the result.
    ///
    /// Returns no later than the task timeout plus [`ExecConfig::grace`].
    /// `request_id` only tags log lines.
    pub async fn execute(&self, task: &Task, request_id: &str) -> ExecOutcome {
        let started = Instant::now();
        let timeout = task.timeout();
        let deadline = started + timeout;

        let mut cmd = shell_command(&self.cfg.shell, task.command());
        if let Some(cwd) = &self.cfg.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        new_session(&mut cmd);

        info!(target: "taskd.exec.shell", id = request_id, task = task.name(), timeout_ms = timeout.as_millis() as u64, "run");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(target: "taskd.exec.shell", id = request_id, task = task.name(), error = %e, "spawn failed");
                return ExecOutcome::failed(
                    FailureKind::SpawnFailure,
                    ExecError::Spawn(e.to_string()),
                    String::new(),
                    String::new(),
                    started.elapsed(),
                );
            }
        };

        let pgid = child.id();
        let mut guard = GroupGuard::new(pgid);
        trace!(target: "taskd.exec.shell", id = request_id, pgid = ?pgid, "spawned");

        let mut stdout = Capture::spawn(child.stdout.take());
        let mut stderr = Capture::spawn(child.stderr.take());

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = tokio::time::sleep_until(deadline) => None,
        };

        match waited {
            Some(status) => {
                // Leader reaped: the group is only signalled again while descendants still hold its pipes.
                guard.disarm();

                // A background child can keep the pipes open after the shell exits.
                // Wait for them until the deadline, then kill the leftovers.
                let mut output_done = stdout.wait_until(deadline).await;
                output_done &= stderr.wait_until(deadline).await;
                if !output_done {
                    if let Some(pgid) = pgid {
                        warn!(target: "taskd.exec.shell", id = request_id, task = task.name(), "descendants still hold output open at deadline; killing group");
                        let _ = kill_group(pgid);
                    }
                    let grace_deadline = Instant::now() + self.cfg.grace;
                    stdout.wait_until(grace_deadline).await;
                    stderr.wait_until(grace_deadline).await;
                }

                let (out, err) = (stdout.take(), stderr.take());
                self.finish(task, request_id, status, out, err, started.elapsed())
            }
            None => {
                warn!(
                    target: "taskd.exec.shell",
                    id = request_id,
                    task = task.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Kill task: deadline exceeded"
                );
                if let Some(pgid) = pgid
                    && let Err(e) = kill_group(pgid)
                {
                    warn!(target: "taskd.exec.shell", id = request_id, error = %e, "failed to kill process group");
                }
                let _ = child.start_kill();

                let grace_deadline = Instant::now() + self.cfg.grace;
                if tokio::time::timeout_at(grace_deadline, child.wait()).await.is_ok() {
                    guard.disarm();
                } else {
                    warn!(target: "taskd.exec.shell", id = request_id, task = task.name(), "child not reaped within grace");
                }
                stdout.wait_until(grace_deadline).await;
                stderr.wait_until(grace_deadline).await;

                ExecOutcome::failed(
                    FailureKind::Timeout,
                    ExecError::Timeout { timeout },
                    stdout.take(),
                    stderr.take(),
                    started.elapsed(),
                )
            }
        }
    }

    fn finish(
        &self,
        task: &Task,
        request_id: &str,
        status: std::io::Result<ExitStatus>,
        output: String,
        stderr: String,
        elapsed: Duration,
    ) -> ExecOutcome {
        let cause = match status {
            Ok(status) if status.success() => {
                debug!(target: "taskd.exec.shell", id = request_id, task = task.name(), elapsed_ms = elapsed.as_millis() as u64, "exit success");
                return ExecOutcome::success(output, stderr, elapsed);
            }
            Ok(status) => exit_cause(status),
            Err(e) => ExecError::from(e),
        };

        error!(
            target: "taskd.exec.shell",
            id = request_id,
            task = task.name(),
            stdout = %output,
            stderr = %stderr,
            error = %cause,
            "task failed"
        );
        ExecOutcome::failed(FailureKind::NonZeroExit, cause, output, stderr, elapsed)
    }
}

fn exit_cause(status: ExitStatus) -> ExecError {
    if let Some(code) = status.code() {
        return ExecError::NonZeroExit { code };
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExecError::KilledBySignal { signal };
        }
    }
    ExecError::NonZeroExit { code: -1 }
}

/// Drains one pipe into a shared buffer.
///
/// The buffer is shared so that whatever arrived before a kill survives an aborted reader.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = reader.map(|mut reader| {
            let buf = Arc::clone(&buf);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let mut buf = buf.lock().unwrap_or_else(PoisonError::into_inner);
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                }
            })
        });
        Self { buf, handle }
    }

    /// Wait for EOF until `deadline`. Returns `true` once the pipe is fully drained.
    async fn wait_until(&mut self, deadline: Instant) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return true;
        };
        if tokio::time::timeout_at(deadline, handle).await.is_err() {
            return false;
        }
        // Reader is done; a completed handle must not be polled again.
        self.handle = None;
        true
    }

    /// Stop reading and return what was captured.
    fn take(&self) -> String {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
        let buf = std::mem::take(&mut *self.buf.lock().unwrap_or_else(PoisonError::into_inner));
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
