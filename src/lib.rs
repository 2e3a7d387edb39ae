//! Gafuzz: compare random, guided and genetic input generation.

#[macro_use]
pub mod candidate;
#[macro_use]
pub mod campaign_log;
pub mod backend;
pub mod campaign;
pub mod config;
pub mod corpus;
pub mod coverage;
pub mod crash;
pub mod exec;
pub mod genetic;
pub mod mutation;
pub mod report;

use crate::{
    backend::probe,
    config::Config,
    corpus::{default_seeds, load_seeds},
    exec::CommandExecutor,
    report::{compare, Comparison},
};
use ahash::AHashSet;
use anyhow::Context;

pub type HashSet<V> = AHashSet<V>;
pub type RngType = rand::rngs::SmallRng;

pub fn boot(config: Config) -> anyhow::Result<Comparison> {
    config.check().context("config error")?;
    println!("{}", GAFUZZ);

    let mut seeds = Vec::new();
    if let Some(input) = config.input.as_ref() {
        log::info!("loading seeds from {}...", input.display());
        seeds = load_seeds(input).context("failed to load seeds")?;
    }
    if seeds.is_empty() {
        log::info!("using built-in seeds");
        seeds = default_seeds();
    }
    log::info!("initialized with {} seeds", seeds.len());

    let backend = probe(
        config.use_real_backend,
        &config.backend_cmd,
        &config.backend_model,
    );
    let mut executor = CommandExecutor::new(config.target.clone(), config.exec_timeout);
    log::info!(
        "target: {}, timeout: {:?}",
        config.target.join(" "),
        config.exec_timeout
    );

    let comparison = compare(&config, &seeds, &backend, &mut executor);
    println!("{}", comparison);

    if let Some(output) = config.output.as_ref() {
        let path = comparison
            .dump_json(output)
            .context("failed to dump results")?;
        log::info!("results written to {}", path.display());
    }
    Ok(comparison)
}

const GAFUZZ: &str = r"
   ____    _    _____ _   _ __________
  / ___|  / \  |  ___| | | |__  /__  /
 | |  _  / _ \ | |_  | | | | / /  / /
 | |_| |/ ___ \|  _| | |_| |/ /_ / /_
  \____/_/   \_\_|    \___//____/____|
";
