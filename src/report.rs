//! Side-by-side comparison of the three methods.
use crate::{
    backend::Backend,
    campaign::{Campaign, CampaignConfig, CampaignResult},
    campaign_log::set_campaign,
    candidate::Candidate,
    config::Config,
    corpus::Corpus,
    coverage::BugKind,
    exec::TargetExecutor,
    mutation::Method,
    RngType,
};
use anyhow::Context;
use rand::SeedableRng;
use serde::Serialize;
use std::{
    cmp::Reverse,
    fmt,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

pub const RESULTS_FILE: &str = "results.json";

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub method: Method,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Winners {
    pub most_crashes: Method,
    pub fastest: Method,
    pub best_coverage: Method,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub budget: u64,
    pub backend: String,
    pub results: Vec<CampaignResult>,
    pub failed: Vec<Failure>,
    pub winners: Option<Winners>,
}

/// Run one campaign per method, one after another.
///
/// Every campaign starts from its own copy of `seeds`. A failed campaign is
/// logged and recorded, the others still run.
pub fn compare(
    config: &Config,
    seeds: &[Candidate],
    backend: &Backend,
    executor: &mut dyn TargetExecutor,
) -> Comparison {
    log::info!(
        "comparing {} methods, {} tests each",
        Method::ALL.len(),
        config.tests_per_method
    );
    let mut results = Vec::with_capacity(Method::ALL.len());
    let mut failed = Vec::new();

    for (i, method) in Method::ALL.iter().copied().enumerate() {
        let campaign_config = CampaignConfig {
            method,
            budget: config.tests_per_method,
            work_dir: config.work_dir.clone(),
            verbose: config.verbose,
        };
        let rng = campaign_rng(config.seed, i as u64);
        let corpus = Corpus::with_seeds(seeds.to_vec());
        let ret = Campaign::new(campaign_config, corpus, backend, &mut *executor, rng).run();
        set_campaign(None);
        match ret {
            Ok(r) => {
                log::info!(
                    "{} done, {} crashes in {:.1}s",
                    method,
                    r.crashes,
                    r.elapsed.as_secs_f64()
                );
                results.push(r);
            }
            Err(e) => {
                log::error!("{} campaign failed: {:?}", method, e);
                failed.push(Failure {
                    method,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    let winners = winners(&results);
    Comparison {
        budget: config.tests_per_method,
        backend: backend.describe(),
        results,
        failed,
        winners,
    }
}

fn campaign_rng(seed: Option<u64>, idx: u64) -> RngType {
    match seed {
        Some(s) => RngType::seed_from_u64(s.wrapping_add(idx)),
        None => RngType::from_entropy(),
    }
}

/// Best method per criterion, first encountered wins ties.
pub fn winners(results: &[CampaignResult]) -> Option<Winners> {
    let most_crashes = results.iter().min_by_key(|r| Reverse(r.crashes))?;
    let fastest = results.iter().min_by_key(|r| r.elapsed)?;
    let best_coverage = results.iter().min_by_key(|r| Reverse(r.bug_types()))?;
    Some(Winners {
        most_crashes: most_crashes.method,
        fastest: fastest.method,
        best_coverage: best_coverage.method,
    })
}

impl Comparison {
    pub fn result_of(&self, method: Method) -> Option<&CampaignResult> {
        self.results.iter().find(|r| r.method == method)
    }

    /// Write the comparison as pretty json to `dir/results.json`.
    pub fn dump_json(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        create_dir_all(dir)
            .with_context(|| format!("failed to create output dir: {}", dir.display()))?;
        let path = dir.join(RESULTS_FILE);
        let content = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "FINAL COMPARISON ({} tests per method, {})", self.budget, self.backend)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<15} {:<12} {:<10} {:<12} {:<12}",
            "Method", "Time (s)", "Crashes", "Bug Types", "Success %"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;
        for r in self.results.iter() {
            writeln!(
                f,
                "{:<15} {:<12.2} {:<10} {:<12} {:<12.1}",
                r.method.name(),
                r.elapsed.as_secs_f64(),
                r.crashes,
                format!("{}/{}", r.bug_types(), BugKind::ALL.len()),
                r.success_rate()
            )?;
        }
        for fail in self.failed.iter() {
            writeln!(f, "{:<15} failed: {}", fail.method.name(), fail.error)?;
        }
        writeln!(f, "{}", rule)?;

        if let Some(w) = self.winners {
            writeln!(f, "WINNERS:")?;
            if let Some(r) = self.result_of(w.most_crashes) {
                writeln!(f, "  Most crashes found: {} ({} crashes)", r.method, r.crashes)?;
            }
            if let Some(r) = self.result_of(w.fastest) {
                writeln!(
                    f,
                    "  Fastest execution: {} ({:.2}s)",
                    r.method,
                    r.elapsed.as_secs_f64()
                )?;
            }
            if let Some(r) = self.result_of(w.best_coverage) {
                writeln!(
                    f,
                    "  Best coverage: {} ({} bug types)",
                    r.method,
                    r.bug_types()
                )?;
            }
        }

        writeln!(f, "FIRST HITS:")?;
        for r in self.results.iter() {
            let hits = r
                .first_hits
                .iter()
                .map(|(k, n)| format!("{}@{}", k, n))
                .collect::<Vec<_>>();
            if hits.is_empty() {
                writeln!(f, "  {}: none", r.method)?;
            } else {
                writeln!(f, "  {}: {}", r.method, hits.join(", "))?;
            }
        }
        Ok(())
    }
}
