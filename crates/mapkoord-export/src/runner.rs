//! Hidden process execution with output-file polling.
//!
//! [`SilentRunner`] is the single "run silently with timeout" capability the
//! orchestrator depends on. [`HiddenProcessRunner`] is the real
//! implementation: no window, no console, captured stdio, completion judged
//! by the destination file rather than the exit code alone.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::convention::Invocation;
use crate::error::ExportError;

/// How long to wait for stdio readers after the process is gone.
const STDIO_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// What to watch while the process runs.
#[derive(Debug, Clone)]
pub struct OutputWatch {
    /// Destination file the tool is expected to write.
    pub path: PathBuf,
    /// Minimum size before the file counts as written.
    pub min_bytes: u64,
    /// Interval between polls.
    pub poll_interval: Duration,
    /// Attempt timeout.
    pub timeout: Duration,
}

/// Why polling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The destination reached the minimum size and stopped growing (or
    /// the process exited).
    OutputReady,
    /// The process exited and the destination never became ready.
    Exited,
    /// The attempt timeout elapsed first.
    TimedOut,
}

/// Result of one silent run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Why polling stopped.
    pub status: RunStatus,
    /// Exit code, when known.
    pub exit_code: Option<i32>,
    /// Whether the process had to be terminated.
    pub terminated: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// OS process id, if the process was started.
    pub pid: Option<u32>,
}

/// Run an invocation hidden, polling its destination file.
///
/// Implementations must not leave the process running when they return.
#[async_trait]
pub trait SilentRunner: Send + Sync {
    /// Start `invocation` and poll `watch` until ready, exit, or timeout.
    ///
    /// A process that cannot be started is an `Err`; everything else is
    /// reported through [`RunOutcome`].
    async fn run(
        &self,
        invocation: &Invocation,
        watch: &OutputWatch,
    ) -> Result<RunOutcome, ExportError>;
}

/// Real process runner.
#[derive(Debug, Clone)]
pub struct HiddenProcessRunner {
    capture_output: bool,
    grace_period: Duration,
}

impl HiddenProcessRunner {
    /// Create a runner.
    pub fn new(capture_output: bool, grace_period: Duration) -> Self {
        Self {
            capture_output,
            grace_period,
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let (stdout_cfg, stderr_cfg) = if self.capture_output {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::null(), Stdio::null())
        };

        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(stdout_cfg)
            .stderr(stderr_cfg)
            .kill_on_drop(true);
        cmd
    }

    /// Graceful stop, then forced kill after the grace period.
    async fn terminate(&self, child: &mut Child) -> Option<ExitStatus> {
        request_stop(child).await;

        match tokio::time::timeout(self.grace_period, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(status = %status, "Process stopped after termination request");
                Some(status)
            }
            _ => {
                warn!(
                    grace_ms = self.grace_period.as_millis() as u64,
                    "Process ignored termination request, killing"
                );
                force_stop(child).await;
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill process");
                }
                child.try_wait().ok().flatten()
            }
        }
    }
}

#[async_trait]
impl SilentRunner for HiddenProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        watch: &OutputWatch,
    ) -> Result<RunOutcome, ExportError> {
        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            cwd = %invocation.working_dir.display(),
            timeout_s = watch.timeout.as_secs(),
            "Spawning hidden process"
        );

        let start = Instant::now();
        let mut child = self.command(invocation).spawn()?;
        let pid = child.id();

        let stdout_task = child.stdout.take().map(|s| tokio::spawn(read_all(s)));
        let stderr_task = child.stderr.take().map(|s| tokio::spawn(read_all(s)));

        let deadline = start + watch.timeout;
        let mut exit_status: Option<ExitStatus> = None;
        let mut previous_size: Option<u64> = None;
        let mut settled = false;

        let status = loop {
            tokio::time::sleep(watch.poll_interval).await;

            if exit_status.is_none() {
                exit_status = child.try_wait()?;
            }

            let size = output_size(&watch.path).await;
            let big_enough = size.is_some_and(|s| s >= watch.min_bytes);
            let stable = size.is_some() && size == previous_size;

            if big_enough && (exit_status.is_some() || stable) {
                break RunStatus::OutputReady;
            }

            if exit_status.is_some() {
                // One extra poll after exit for tools that flush late.
                if settled {
                    break RunStatus::Exited;
                }
                settled = true;
            } else if Instant::now() >= deadline {
                break RunStatus::TimedOut;
            }

            previous_size = size;
        };

        let mut terminated = false;
        if exit_status.is_none() {
            terminated = true;
            exit_status = self.terminate(&mut child).await;
        }

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;
        let elapsed = start.elapsed();

        info!(
            convention = %invocation.convention,
            status = ?status,
            exit_code = ?exit_status.and_then(|s| s.code()),
            terminated,
            elapsed_ms = elapsed.as_millis() as u64,
            "Hidden process finished"
        );

        Ok(RunOutcome {
            status,
            exit_code: exit_status.and_then(|s| s.code()),
            terminated,
            stdout,
            stderr,
            elapsed,
            pid,
        })
    }
}

/// Current size of `path`, if it is a file.
async fn output_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

async fn read_all<R: tokio::io::AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).to_string()
}

/// Collect a stdio reader, giving up if the pipe stays open.
async fn drain(task: Option<JoinHandle<String>>) -> String {
    let Some(task) = task else {
        return String::new();
    };
    let abort = task.abort_handle();
    match tokio::time::timeout(STDIO_DRAIN_TIMEOUT, task).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            debug!(error = %e, "stdio reader task failed");
            String::new()
        }
        Err(_) => {
            abort.abort();
            debug!("stdio pipe still open after process exit, output discarded");
            String::new()
        }
    }
}

/// Ask the process to exit (SIGTERM / `taskkill /T` without `/F`).
#[cfg(unix)]
async fn request_stop(child: &Child) {
    if let Some(pid) = child.id() {
        // SAFETY: sending a signal to a pid we spawned and have not reaped.
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc != 0 {
            debug!(pid, "SIGTERM delivery failed");
        }
    }
}

#[cfg(windows)]
async fn request_stop(child: &Child) {
    taskkill_tree(child, false).await;
}

#[cfg(not(any(unix, windows)))]
async fn request_stop(_child: &Child) {}

/// Kill processes the child started before the child itself is killed.
///
/// A launcher such as PowerShell's `Start-Process` leaves the tool as a
/// grandchild that `Child::kill` does not reach.
#[cfg(windows)]
async fn force_stop(child: &Child) {
    taskkill_tree(child, true).await;
}

#[cfg(not(windows))]
async fn force_stop(_child: &Child) {}

/// Arguments for `taskkill` over the whole process tree of `pid`.
#[cfg_attr(not(windows), allow(dead_code))]
fn taskkill_args(pid: u32, force: bool) -> Vec<String> {
    let mut args = vec!["/PID".to_string(), pid.to_string(), "/T".to_string()];
    if force {
        args.push("/F".to_string());
    }
    args
}

#[cfg(windows)]
async fn taskkill_tree(child: &Child, force: bool) {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    if let Some(pid) = child.id() {
        let result = Command::new("taskkill")
            .args(taskkill_args(pid, force))
            .creation_flags(CREATE_NO_WINDOW)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(e) = result {
            debug!(pid, force, error = %e, "taskkill failed");
        }
    }
}
