use crate::exec::DEFAULT_TIMEOUT;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    /// Ask the model backend for guided overrides instead of templates only.
    pub use_real_backend: bool,
    pub tests_per_method: u64,
    /// Progress reporting only, never changes behavior.
    pub verbose: bool,
    /// Target command line, the staged input path is appended.
    pub target: Vec<String>,
    pub exec_timeout: Duration,
    /// Where staged inputs are written.
    pub work_dir: PathBuf,
    /// Directory of json seeds, built-in seeds if absent.
    pub input: Option<PathBuf>,
    /// Directory of `results.json`.
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub backend_cmd: String,
    pub backend_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_real_backend: false,
            tests_per_method: 30,
            verbose: true,
            target: vec!["python3".to_string(), "vulnerable_parser.py".to_string()],
            exec_timeout: DEFAULT_TIMEOUT,
            work_dir: PathBuf::from("./test_files"),
            input: None,
            output: None,
            seed: None,
            backend_cmd: "ollama".to_string(),
            backend_model: "llama3.2".to_string(),
        }
    }
}

impl Config {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.target.is_empty() || self.target[0].is_empty() {
            anyhow::bail!("empty target command");
        }
        if self.tests_per_method == 0 {
            anyhow::bail!("tests per method must be positive");
        }
        if self.exec_timeout == Duration::from_secs(0) {
            anyhow::bail!("exec timeout must be positive");
        }
        if let Some(i) = self.input.as_ref() {
            if !i.is_dir() {
                anyhow::bail!("bad input seeds dir: {}", i.display());
            }
        }
        if let Some(o) = self.output.as_ref() {
            if o.is_file() {
                anyhow::bail!("output ({}) is a file", o.display());
            }
        }
        if self.use_real_backend && (self.backend_cmd.is_empty() || self.backend_model.is_empty()) {
            anyhow::bail!("model backend enabled without command or model");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::{path::PathBuf, time::Duration};

    #[test]
    fn default_is_valid() {
        assert!(Config::default().check().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            Config {
                target: Vec::new(),
                ..Default::default()
            },
            Config {
                tests_per_method: 0,
                ..Default::default()
            },
            Config {
                exec_timeout: Duration::from_secs(0),
                ..Default::default()
            },
            Config {
                input: Some(PathBuf::from("/nonexistent/gafuzz-seeds")),
                ..Default::default()
            },
            Config {
                use_real_backend: true,
                backend_model: String::new(),
                ..Default::default()
            },
        ];
        for c in bad.iter() {
            assert!(c.check().is_err(), "{:?}", c);
        }
    }
}
