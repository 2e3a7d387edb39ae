use env_logger::{Env, TimestampPrecision};
use gafuzz::{boot, config::Config};
use std::{path::PathBuf, time::Duration};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "gafuzz",
    about = "Compare random, guided and genetic fuzzing against one target."
)]
struct Settings {
    /// Tests run by each method.
    #[structopt(long, short = "n", default_value = "30")]
    tests: u64,
    /// Ask the model backend for guided mutations.
    #[structopt(long, short = "l")]
    use_llm: bool,
    /// Only log results, no progress lines.
    #[structopt(long, short = "q")]
    quiet: bool,
    /// Directory of json seeds, built-in seeds if absent.
    #[structopt(long, short = "i")]
    input: Option<PathBuf>,
    /// Directory to write results.json.
    #[structopt(long, short = "o")]
    output: Option<PathBuf>,
    /// Directory of staged test inputs.
    #[structopt(long, short = "w", default_value = "./test_files")]
    work_dir: PathBuf,
    /// Per-test timeout in milliseconds.
    #[structopt(long, short = "t", default_value = "2000")]
    timeout: u64,
    /// Seed of the random generators, reproducible runs.
    #[structopt(long, short = "s")]
    seed: Option<u64>,
    /// Model backend command.
    #[structopt(long, default_value = "ollama")]
    llm_cmd: String,
    /// Model name.
    #[structopt(long, default_value = "llama3.2")]
    llm_model: String,
    /// Target command split on whitespace, the staged input path is appended.
    #[structopt(default_value = "python3 vulnerable_parser.py")]
    target: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::from_args();

    let log_env = Env::new()
        .filter_or("GAFUZZ_LOG", "info")
        .default_write_style_or("auto");
    env_logger::Builder::from_env(log_env)
        .format_timestamp(Some(TimestampPrecision::Seconds))
        .init();

    let target = settings
        .target
        .iter()
        .flat_map(|t| t.split_whitespace())
        .map(|t| t.to_string())
        .collect();
    let config = Config {
        use_real_backend: settings.use_llm,
        tests_per_method: settings.tests,
        verbose: !settings.quiet,
        target,
        exec_timeout: Duration::from_millis(settings.timeout),
        work_dir: settings.work_dir,
        input: settings.input,
        output: settings.output,
        seed: settings.seed,
        backend_cmd: settings.llm_cmd,
        backend_model: settings.llm_model,
    };

    boot(config).map(|_| ())
}
