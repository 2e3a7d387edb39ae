//! Target execution.
//!
//! Candidates are staged as json files, then handed to a [`TargetExecutor`].
//! [`CommandExecutor`] runs the target as a child process and kills it once the
//! per-test timeout expires.
use crate::{candidate::Candidate, mutation::Method};
use std::{
    fs::{create_dir_all, read_to_string, write},
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{channel, Receiver},
    thread::{self, sleep},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Marker the target prints when one of its defects fires.
pub const CRASH_MARKER: &str = "CRASH";
/// Output reported for a test killed by timeout.
pub const TIMEOUT_OUTPUT: &str = "CRASH: Timeout - possible infinite loop";
/// Default per-test timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum StageError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Path of the staged input of test `test_no`.
pub fn staged_path(dir: &Path, method: Method, test_no: u64) -> PathBuf {
    dir.join(format!("test_{}_{}.json", method, test_no))
}

/// Write `c` to its own file under `dir`.
pub fn stage(dir: &Path, method: Method, test_no: u64, c: &Candidate) -> Result<PathBuf, StageError> {
    let content = c.to_json()?;
    let path = staged_path(dir, method, test_no);
    write(&path, content)?;
    Ok(path)
}

/// Read back a staged input.
pub fn load_staged(path: &Path) -> Result<Candidate, StageError> {
    let content = read_to_string(path)?;
    Ok(Candidate::from_json(&content)?)
}

pub fn prepare_stage_dir(dir: &Path) -> Result<(), StageError> {
    create_dir_all(dir)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Normal,
    /// Non-zero exit code, or `None` if killed by a signal.
    Abnormal(Option<i32>),
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Stdout followed by stderr.
    pub output: String,
    pub status: ExecStatus,
}

impl ExecOutcome {
    pub fn timeout() -> Self {
        Self {
            output: TIMEOUT_OUTPUT.to_string(),
            status: ExecStatus::Timeout,
        }
    }

    #[inline]
    pub fn crashed(&self) -> bool {
        self.output.contains(CRASH_MARKER) || self.status != ExecStatus::Normal
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("spawn: {0}")]
    Spawn(io::Error),
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("empty target command")]
    EmptyCommand,
}

/// Runs the target on one staged input.
pub trait TargetExecutor {
    fn execute(&mut self, input: &Path) -> Result<ExecOutcome, ExecError>;
}

/// Runs `cmd <input>` as a child process.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    cmd: Vec<String>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(cmd: Vec<String>, timeout: Duration) -> Self {
        Self { cmd, timeout }
    }
}

impl TargetExecutor for CommandExecutor {
    fn execute(&mut self, input: &Path) -> Result<ExecOutcome, ExecError> {
        let (prog, args) = self.cmd.split_first().ok_or(ExecError::EmptyCommand)?;
        let mut cmd = Command::new(prog);
        cmd.args(args).arg(input);
        let ret = run_with_timeout(cmd, self.timeout)?;
        let status = match ret.status {
            None => return Ok(ExecOutcome::timeout()),
            Some(s) if s.success() => ExecStatus::Normal,
            Some(s) => ExecStatus::Abnormal(s.code()),
        };
        let mut output = String::from_utf8_lossy(&ret.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&ret.stderr));
        Ok(ExecOutcome { output, status })
    }
}

/// Collected result of a child process.
#[derive(Debug)]
pub struct RunOutput {
    /// `None` if the child was killed by timeout.
    pub status: Option<ExitStatus>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Grace period for draining output once the child is gone.
const OUTPUT_GRACE: Duration = Duration::from_millis(50);

/// Run `cmd` to completion, killing it after `timeout`.
///
/// Output is collected until the pipes close or the deadline passes, so
/// descendants still holding the pipes can not stall the caller.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<RunOutput, ExecError> {
    let start = Instant::now();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ExecError::Spawn)?;
    let stdout = child.stdout.take().map(read_background);
    let stderr = child.stderr.take().map(read_background);

    let status = match wait_timeout(&mut child, timeout) {
        Ok(s) => s,
        Err(e) => {
            kill(&mut child);
            return Err(e.into());
        }
    };
    if status.is_none() {
        kill(&mut child);
    }

    let deadline = (start + timeout).max(Instant::now() + OUTPUT_GRACE);
    Ok(RunOutput {
        status,
        stdout: stdout.map(|rx| collect_output(&rx, deadline)).unwrap_or_default(),
        stderr: stderr.map(|rx| collect_output(&rx, deadline)).unwrap_or_default(),
    })
}

fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let now = Instant::now();
    let mut delta = Duration::from_millis(1);
    let max_delta = Duration::from_millis(50);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if now.elapsed() >= timeout {
            return Ok(None);
        }
        sleep(delta);
        if delta < max_delta {
            delta *= 2;
        }
    }
}

#[inline]
fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_background<R: Read + Send + 'static>(mut f: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let mut buf = vec![0_u8; 4096];
        while let Ok(sz) = f.read(&mut buf[..]) {
            if sz == 0 || tx.send(buf[..sz].to_vec()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Take chunks until the writer hangs up or `deadline` passes.
fn collect_output(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(chunk) => out.extend_from_slice(&chunk),
            Err(_) => break,
        }
    }
    out
}
