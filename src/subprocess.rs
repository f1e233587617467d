//! Helper programs (capture, analysis) run under a deadline.
//!
//! Each child gets its own process group on Unix, so a Ctrl+C aimed at the
//! agent's terminal does not reach it; the agent's stop flag decides when
//! to stop instead. A child still running at the deadline is killed and
//! reaped before returning.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Collected result of a finished child.
#[derive(Debug)]
pub(crate) struct ChildOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ChildOutput {
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, Error)]
pub(crate) enum RunError {
    #[error("failed to start: {0}")]
    Spawn(io::Error),
    #[error("no result within {0:?}, killed")]
    TimedOut(Duration),
    #[error("{0}")]
    Io(io::Error),
}

/// Run `program` once, feeding `input` on stdin, and wait at most `timeout`.
pub(crate) fn run_bounded(
    program: &str,
    args: &[String],
    input: Option<&[u8]>,
    timeout: Duration,
) -> Result<ChildOutput, RunError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(RunError::Spawn)?;

    // Pipes are serviced on their own threads so a chatty child cannot stall.
    let writer = match (child.stdin.take(), input) {
        (Some(mut stdin), Some(data)) => {
            let data = data.to_vec();
            Some(thread::spawn(move || stdin.write_all(&data)))
        }
        _ => None,
    };
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                tracing::debug!(program, pid = child.id(), "Killing child past its deadline");
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::TimedOut(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Io(e));
            }
        }
    };

    if let Some(handle) = writer {
        if let Ok(Err(e)) = handle.join() {
            tracing::debug!(program, "Child closed stdin early: {e}");
        }
    }

    Ok(ChildOutput {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, RunError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| RunError::Io(io::Error::other("output reader panicked")))?
            .map_err(RunError::Io),
        None => Ok(Vec::new()),
    }
}
