use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::harness::RoundTripTool;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs a shell command per snippet: source on stdin, re-emitted text on
/// stdout. A non-zero exit status counts as a parse failure.
///
/// Stdin is fed and stdout/stderr are drained on their own threads, so a
/// tool that streams output while reading never stalls on a full pipe.
pub struct CommandTool {
    command: String,
    timeout: Option<Duration>,
}

impl CommandTool {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
        }
    }

    /// Kill the command, and everything it started, once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn spawn(&self) -> Result<Child, ParseError> {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        command
            .spawn()
            .map_err(|e| ParseError::command_io(&self.command, e))
    }

    fn timed_out(&self, child: &mut Child) -> ParseError {
        let timeout = self.timeout.unwrap_or_default();
        warn!(command = %self.command, pid = child.id(), "killing tool after timeout");
        terminate(child);
        ParseError::command_timed_out(&self.command, timeout)
    }
}

impl RoundTripTool for CommandTool {
    fn name(&self) -> &str {
        &self.command
    }

    fn round_trip(&self, source: &str) -> Result<String, ParseError> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut child = self.spawn()?;
        trace!(command = %self.command, pid = child.id(), "spawned tool");

        let writer = child
            .stdin
            .take()
            .map(|stdin| feed(stdin, source.to_string()));
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match wait(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => return Err(self.timed_out(&mut child)),
            Err(e) => {
                terminate(&mut child);
                return Err(ParseError::command_io(&self.command, e));
            }
        };

        // A tool may exit without draining stdin; its exit status decides.
        let written = writer
            .filter(JoinHandle::is_finished)
            .map(JoinHandle::join);
        if let Some(Ok(Err(e))) = written {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(ParseError::command_io(&self.command, e));
            }
        }

        let stdout = match collect(stdout, deadline) {
            Collected::Done(bytes) => bytes,
            Collected::Failed(e) => return Err(ParseError::command_io(&self.command, e)),
            Collected::TimedOut => return Err(self.timed_out(&mut child)),
        };
        let stderr = match collect(stderr, deadline) {
            Collected::Done(bytes) => bytes,
            Collected::Failed(_) | Collected::TimedOut => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(ParseError::command_failed(
                &self.command,
                status.to_string(),
                stderr.trim(),
            ));
        }

        debug!(command = %self.command, bytes = stdout.len(), "tool finished");
        String::from_utf8(stdout).map_err(|_| ParseError::InvalidOutput {
            command: self.command.clone(),
        })
    }
}

fn feed(mut stdin: ChildStdin, source: String) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || stdin.write_all(source.as_bytes()))
}

/// Detached so a leftover grandchild holding the pipe open cannot block us.
fn drain(mut pipe: impl Read + Send + 'static) -> Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = tx.send(pipe.read_to_end(&mut buf).map(|_| buf));
    });
    rx
}

enum Collected {
    Done(Vec<u8>),
    Failed(io::Error),
    TimedOut,
}

fn collect(pipe: Option<Receiver<io::Result<Vec<u8>>>>, deadline: Option<Instant>) -> Collected {
    let Some(rx) = pipe else {
        return Collected::Done(Vec::new());
    };
    let received = match deadline {
        Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(Ok(bytes)) => Collected::Done(bytes),
        Ok(Err(e)) => Collected::Failed(e),
        Err(RecvTimeoutError::Timeout) => Collected::TimedOut,
        Err(RecvTimeoutError::Disconnected) => Collected::Done(Vec::new()),
    }
}

/// `Ok(None)` once the deadline passes with the child still running.
fn wait(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// The shell leads its own process group, so killing the group also takes
/// down whatever it spawned.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = killed {
            debug!(error = %e, "failed to signal process group");
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
