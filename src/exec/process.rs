// src/exec/process.rs

//! Command execution boundary.
//!
//! [`run_command`] spawns one external command, streams its stdout and
//! stderr line-by-line into the run log as they are produced (several
//! maintenance commands run for minutes, so live visibility is part of
//! the contract, not a nicety), and supervises the child with a short
//! polling loop so cancellation is observed promptly:
//!
//! - cancel set and `allow_terminate`: request a graceful stop, then
//!   force-kill after a fixed grace period.
//! - cancel set and not `allow_terminate`: note it once and let the
//!   command finish on its own.
//!
//! A non-zero exit code is a normal result at this layer, never an
//! error. The [`CommandRunner`] trait is the seam tests use to swap in a
//! recording double that spawns no processes.

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::{MaintError, Result};
use crate::exec::context::CancelSignal;
use crate::runlog::{Level, RunLog};

/// How often the supervisor polls for child exit and cancellation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long a graceful stop may take before the child is force-killed.
pub const KILL_GRACE: Duration = Duration::from_millis(800);

/// One external command: an argv list, executed directly by default or
/// through the platform shell (`cmd /C` on Windows, `sh -c` elsewhere)
/// when `shell` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub shell: bool,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            shell: false,
        }
    }

    /// A single command line to be interpreted by the platform shell.
    pub fn via_shell(line: impl Into<String>) -> Self {
        Self {
            argv: vec![line.into()],
            shell: true,
        }
    }

    /// The command as one displayable line.
    pub fn display_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Write the pre-execution line for this command. Dry runs call this
    /// too, so their log output matches a real run up to the point of
    /// execution.
    pub fn log_invocation(&self, log: &RunLog) {
        log.info(format!("$ {}", self.display_line()));
    }

    fn command(&self) -> Command {
        if self.shell {
            let line = self.argv.join(" ");
            if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(line);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(line);
                c
            }
        } else {
            let mut c = Command::new(&self.argv[0]);
            c.args(&self.argv[1..]);
            c
        }
    }
}

/// Captured outcome of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait abstracting how commands are executed.
///
/// Production code uses [`SystemRunner`]; tests provide an
/// implementation that records the command and completes immediately.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        spec: CommandSpec,
        log: Arc<RunLog>,
        cancel: CancelSignal,
        allow_terminate: bool,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessResult>> + Send + '_>>;
}

/// Real command runner: spawns OS processes via [`run_command`].
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        spec: CommandSpec,
        log: Arc<RunLog>,
        cancel: CancelSignal,
        allow_terminate: bool,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessResult>> + Send + '_>> {
        Box::pin(run_command(spec, log, cancel, allow_terminate))
    }
}

/// Execute one external command, streaming output into `log` and
/// honoring the cancellation policy for this single invocation.
pub async fn run_command(
    spec: CommandSpec,
    log: Arc<RunLog>,
    cancel: CancelSignal,
    allow_terminate: bool,
) -> Result<ProcessResult> {
    if spec.argv.is_empty() {
        return Err(MaintError::Config("empty command".to_string()));
    }

    spec.log_invocation(&log);

    let mut command = spec.command();
    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning '{}'", spec.display_line()))?;

    let out_handle = spawn_line_forwarder(child.stdout.take(), Arc::clone(&log), Level::Info);
    let err_handle = spawn_line_forwarder(child.stderr.take(), Arc::clone(&log), Level::Warn);

    let status = supervise(&mut child, &log, &cancel, allow_terminate).await?;

    // Drain whatever the readers still hold; the pipes close with the
    // process, so the handles finish on their own. A reader that failed
    // mid-stream just yields what it collected.
    let stdout = join_lines(out_handle).await;
    let stderr = join_lines(err_handle).await;

    let exit_code = status.code().unwrap_or(1);
    debug!(exit_code, cmd = %spec.display_line(), "command exited");

    Ok(ProcessResult {
        exit_code,
        stdout,
        stderr,
    })
}

/// Poll the child until it exits, applying the cancellation policy.
async fn supervise(
    child: &mut Child,
    log: &RunLog,
    cancel: &CancelSignal,
    allow_terminate: bool,
) -> Result<ExitStatus> {
    let mut cancel_noted = false;
    let mut terminate_requested: Option<Instant> = None;
    let mut force_killed = false;

    loop {
        if let Some(status) = child.try_wait().context("polling child process")? {
            return Ok(status);
        }

        if cancel.is_set() {
            if !allow_terminate {
                if !cancel_noted {
                    log.warn("cancel requested; letting the current command finish");
                    cancel_noted = true;
                }
            } else {
                match terminate_requested {
                    None => {
                        log.warn("cancel requested; stopping the current command");
                        request_graceful_stop(child);
                        terminate_requested = Some(Instant::now());
                    }
                    Some(since) if !force_killed && since.elapsed() >= KILL_GRACE => {
                        // Best effort only; an unterminable child is not
                        // retried.
                        warn!("child did not stop within the grace period; killing");
                        let _ = child.start_kill();
                        force_killed = true;
                    }
                    Some(_) => {}
                }
            }
        }

        sleep(POLL_INTERVAL).await;
    }
}

#[cfg(unix)]
fn request_graceful_stop(child: &mut Child) {
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn request_graceful_stop(child: &mut Child) {
    // No portable graceful stop on this platform; terminate outright.
    let _ = child.start_kill();
}

fn spawn_line_forwarder<R>(
    stream: Option<R>,
    log: Arc<RunLog>,
    level: Level,
) -> Option<JoinHandle<Vec<String>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let stream = stream?;
    Some(tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            match level {
                Level::Warn => log.warn(&line),
                _ => log.info(&line),
            }
            collected.push(line);
        }
        collected
    }))
}

async fn join_lines(handle: Option<JoinHandle<Vec<String>>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default().join("\n"),
        None => String::new(),
    }
}
