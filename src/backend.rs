//! Optional language model backend for guided mutation.
//!
//! The backend is probed once, the result is handed to the strategies as a
//! [`Backend`]. Any failure degrades to the fixed templates.
use crate::{
    candidate::Candidate,
    exec::{run_with_timeout, ExecError},
};
use std::{process::Command, time::Duration};
use thiserror::Error;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("exec: {0}")]
    Exec(#[from] ExecError),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    #[error("exited with {0}")]
    Status(String),
    #[error("no usable suggestion")]
    NoSuggestion,
}

#[derive(Debug, Clone)]
pub enum Backend {
    Unavailable,
    Available(ModelService),
}

impl Backend {
    #[inline]
    pub fn is_available(&self) -> bool {
        matches!(self, Backend::Available(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Unavailable => "templates".to_string(),
            Backend::Available(s) => format!("{} ({})", s.cmd, s.model),
        }
    }
}

/// Capability detection, never fails.
pub fn probe(enabled: bool, cmd: &str, model: &str) -> Backend {
    if !enabled {
        log::info!("model backend disabled, using template mutations");
        return Backend::Unavailable;
    }
    log::info!("checking for model backend '{}'...", cmd);
    let mut list = Command::new(cmd);
    list.arg("list");
    match run_with_timeout(list, PROBE_TIMEOUT) {
        Ok(ret) if ret.status.map_or(false, |s| s.success()) => {
            log::info!("model backend '{}' is available", cmd);
            Backend::Available(ModelService::new(cmd, model, REQUEST_TIMEOUT))
        }
        Ok(_) => {
            log::info!("model backend '{}' failed, using template mutations", cmd);
            Backend::Unavailable
        }
        Err(e) => {
            log::info!(
                "model backend '{}' not available ({}), using template mutations",
                cmd,
                e
            );
            Backend::Unavailable
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelService {
    cmd: String,
    model: String,
    timeout: Duration,
}

impl ModelService {
    pub fn new(cmd: &str, model: &str, timeout: Duration) -> Self {
        Self {
            cmd: cmd.to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    /// Ask the model for up to `n` field overrides targeting defects of `parent`.
    pub fn request_overrides(
        &self,
        parent: &Candidate,
        n: usize,
    ) -> Result<Vec<Candidate>, BackendError> {
        let mut run = Command::new(&self.cmd);
        run.arg("run").arg(&self.model).arg(prompt(parent, n));
        let ret = run_with_timeout(run, self.timeout)?;
        match ret.status {
            None => return Err(BackendError::Timeout(self.timeout)),
            Some(s) if !s.success() => return Err(BackendError::Status(s.to_string())),
            _ => (),
        }
        let overrides = parse_overrides(&String::from_utf8_lossy(&ret.stdout), n);
        if overrides.is_empty() {
            Err(BackendError::NoSuggestion)
        } else {
            Ok(overrides)
        }
    }
}

fn prompt(parent: &Candidate, n: usize) -> String {
    format!(
        "You are testing a JSON user record parser for crashes. Input: {}\n\
         Suggest {} JSON objects, one per line and nothing else, each overriding \
         a few fields with values likely to trigger buffer overflows, command \
         injection, negative number logic errors, oversized arrays or division by zero. \
         Use only strings, integers and arrays.",
        parent, n
    )
}

/// Collect json objects from `answer`, at most `n`.
pub fn parse_overrides(answer: &str, n: usize) -> Vec<Candidate> {
    answer
        .lines()
        .filter_map(|l| {
            let start = l.find('{')?;
            let end = l.rfind('}')?;
            if end < start {
                return None;
            }
            Candidate::from_json(&l[start..=end]).ok()
        })
        .filter(|c| !c.is_empty())
        .take(n)
        .collect()
}
