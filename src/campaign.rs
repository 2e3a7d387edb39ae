//! Campaign runner.
//!
//! One campaign drives a single [`Method`] for a fixed test budget: draw a
//! parent, mutate, stage and execute each candidate, then update the coverage,
//! the corpus and the crash store in test order.
use crate::{
    backend::Backend,
    campaign_log::set_campaign,
    candidate::Candidate,
    corpus::Corpus,
    coverage::{BugKind, Coverage},
    crash::{CrashRecord, Crashes},
    exec::{prepare_stage_dir, stage, TargetExecutor},
    genetic::seed::default_base,
    mutation::{mutate, Method},
    RngType,
};
use anyhow::Context;
use serde::{Serialize, Serializer};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    time::{Duration, Instant},
};

/// Tests between two progress lines.
pub const PROGRESS_PERIOD: u64 = 20;
/// Consecutive staging failures tolerated before the campaign gives up.
pub const MAX_STAGE_FAILURES: u64 = 128;

#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub method: Method,
    pub budget: u64,
    pub work_dir: PathBuf,
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignResult {
    pub method: Method,
    #[serde(rename = "time", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub tests: u64,
    pub crashes: u64,
    pub bug_kinds: Vec<BugKind>,
    /// Test number of the first hit of each bug kind.
    pub first_hits: BTreeMap<BugKind, u64>,
    pub corpus_size: usize,
    pub crash_details: Vec<CrashRecord>,
}

impl CampaignResult {
    #[inline]
    pub fn bug_types(&self) -> usize {
        self.bug_kinds.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.tests == 0 {
            0.0
        } else {
            self.crashes as f64 / self.tests as f64 * 100.0
        }
    }
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

pub struct Campaign<'a> {
    config: CampaignConfig,
    backend: &'a Backend,
    executor: &'a mut dyn TargetExecutor,
    rng: RngType,

    corpus: Corpus,
    crashes: Crashes,
    coverage: Coverage,
    first_hits: BTreeMap<BugKind, u64>,
    tests: u64,
}

impl<'a> Campaign<'a> {
    pub fn new(
        config: CampaignConfig,
        corpus: Corpus,
        backend: &'a Backend,
        executor: &'a mut dyn TargetExecutor,
        rng: RngType,
    ) -> Self {
        Self {
            config,
            backend,
            executor,
            rng,
            corpus,
            crashes: Crashes::new(),
            coverage: Coverage::new(),
            first_hits: BTreeMap::new(),
            tests: 0,
        }
    }

    /// Run until the budget is spent.
    pub fn run(mut self) -> anyhow::Result<CampaignResult> {
        let method = self.config.method;
        set_campaign(Some(method));
        prepare_stage_dir(&self.config.work_dir).with_context(|| {
            format!(
                "failed to prepare work dir: {}",
                self.config.work_dir.display()
            )
        })?;
        campaign_info!(
            "starting, budget {} tests, {} seeds",
            self.config.budget,
            self.corpus.len()
        );

        let start = Instant::now();
        let mut stage_failures = 0;
        while self.tests < self.config.budget {
            let parent = self
                .corpus
                .select_one(&mut self.rng)
                .cloned()
                .unwrap_or_else(default_base);
            let batch = mutate(
                method,
                self.backend,
                &self.corpus,
                &self.crashes,
                &mut self.rng,
                &parent,
            );
            if batch.is_empty() {
                campaign_debug!("empty batch, retrying");
                continue;
            }

            for c in batch {
                if self.tests >= self.config.budget {
                    break;
                }
                if self.execute_one(c) {
                    stage_failures = 0;
                } else {
                    stage_failures += 1;
                    if stage_failures >= MAX_STAGE_FAILURES {
                        anyhow::bail!("failed to stage {} inputs in a row", stage_failures);
                    }
                }
            }
        }

        let result = CampaignResult {
            method,
            elapsed: start.elapsed(),
            tests: self.tests,
            crashes: self.crashes.len() as u64,
            bug_kinds: self.coverage.covered(),
            first_hits: self.first_hits,
            corpus_size: self.corpus.len(),
            crash_details: self.crashes.into_records(),
        };
        summary(&result);
        Ok(result)
    }

    /// Stage and execute `c`, returns false if it could not be staged.
    fn execute_one(&mut self, c: Candidate) -> bool {
        let test_no = self.tests + 1;
        let path = match stage(&self.config.work_dir, self.config.method, test_no, &c) {
            Ok(p) => p,
            Err(e) => {
                campaign_warn!("failed to stage test {}, skipped: {}", test_no, e);
                return false;
            }
        };

        let (crashed, output) = match self.executor.execute(&path) {
            Ok(outcome) => (outcome.crashed(), outcome.output),
            Err(e) => {
                campaign_warn!("failed to run test {}: {}", test_no, e);
                (false, format!("Error running test: {}", e))
            }
        };
        self.tests = test_no;

        let new_kinds = self.coverage.observe(&output);
        for kind in new_kinds.iter() {
            self.first_hits.entry(*kind).or_insert(test_no);
            campaign_debug!("new bug type '{}' at test #{}", kind, test_no);
        }

        if crashed {
            self.crashes.record(test_no, c.clone(), output);
            if self.config.verbose {
                campaign_info!("bug #{} found at test #{}", self.crashes.len(), test_no);
            }
            self.corpus.add(c);
        } else if !new_kinds.is_empty() {
            self.corpus.add(c);
        }

        if self.config.verbose && test_no % PROGRESS_PERIOD == 0 {
            campaign_info!(
                "progress: {}/{} tests, {} crashes, {}/{} bug types",
                test_no,
                self.config.budget,
                self.crashes.len(),
                self.coverage.count(),
                BugKind::ALL.len()
            );
        }
        true
    }
}

fn summary(r: &CampaignResult) {
    campaign_info!("========== results: {} ==========", r.method);
    campaign_info!("time taken: {:.2}s", r.elapsed.as_secs_f64());
    campaign_info!("tests run: {}", r.tests);
    campaign_info!("crashes found: {}", r.crashes);
    campaign_info!(
        "unique bug types: {}/{}",
        r.bug_types(),
        BugKind::ALL.len()
    );
    campaign_info!("success rate: {:.1}%", r.success_rate());
}

#[cfg(test)]
mod tests {
    use super::{Campaign, CampaignConfig, CampaignResult, MAX_STAGE_FAILURES};
    use crate::{
        backend::Backend,
        corpus::{default_seeds, Corpus},
        exec::{ExecError, ExecOutcome, ExecStatus, TargetExecutor},
        mutation::Method,
    };
    use rand::{prelude::SmallRng, SeedableRng};
    use std::{
        env, fs, io,
        path::{Path, PathBuf},
        time::Duration,
    };

    /// Crashes on every other call, fails to run every seventh.
    struct Alternating(u64);

    impl TargetExecutor for Alternating {
        fn execute(&mut self, _input: &Path) -> Result<ExecOutcome, ExecError> {
            self.0 += 1;
            if self.0 % 7 == 0 {
                return Err(ExecError::Spawn(io::Error::new(
                    io::ErrorKind::NotFound,
                    "gone",
                )));
            }
            let outcome = if self.0 % 2 == 0 {
                ExecOutcome {
                    output: "CRASH: Negative age: -1".to_string(),
                    status: ExecStatus::Abnormal(Some(1)),
                }
            } else {
                ExecOutcome {
                    output: "User accepted".to_string(),
                    status: ExecStatus::Normal,
                }
            };
            Ok(outcome)
        }
    }

    fn run(method: Method, budget: u64, tag: &str) -> CampaignResult {
        let work_dir = env::temp_dir().join(format!("gafuzz-unit-{}-{}", tag, std::process::id()));
        let config = CampaignConfig {
            method,
            budget,
            work_dir: work_dir.clone(),
            verbose: true,
        };
        let mut exec = Alternating(0);
        let r = Campaign::new(
            config,
            Corpus::with_seeds(default_seeds()),
            &Backend::Unavailable,
            &mut exec,
            SmallRng::seed_from_u64(41),
        )
        .run()
        .unwrap();
        fs::remove_dir_all(&work_dir).unwrap();
        r
    }

    #[test]
    fn counts_tests_and_crashes() {
        let r = run(Method::Random, 25, "count");
        assert_eq!(r.tests, 25);
        // even calls crash, except 14 which failed to run
        assert_eq!(r.crashes, 11);
        assert_eq!(r.crash_details.len(), 11);
        assert_eq!(r.bug_types(), 1);
        assert_eq!(r.first_hits.values().copied().collect::<Vec<_>>(), [2]);
        assert_eq!(r.corpus_size, 8 + 11);
        assert!((r.success_rate() - 44.0).abs() < 1e-9);
    }

    #[test]
    fn crash_numbers_increase() {
        let r = run(Method::Genetic, 13, "order");
        assert_eq!(r.tests, 13);
        let nos = r.crash_details.iter().map(|c| c.test_no).collect::<Vec<_>>();
        assert_eq!(nos, [2, 4, 6, 8, 10, 12]);
    }

    #[test]
    fn zero_budget() {
        let r = run(Method::Guided, 0, "zero");
        assert_eq!(r.tests, 0);
        assert_eq!(r.success_rate(), 0.0);
        assert!(r.elapsed < Duration::from_secs(5));
    }

    fn blocked_work_dir(tag: &str) -> PathBuf {
        let work_dir = env::temp_dir().join(format!("gafuzz-unit-{}-{}", tag, std::process::id()));
        // a directory where the first staged input should go
        fs::create_dir_all(work_dir.join("test_random_1.json")).unwrap();
        work_dir
    }

    #[test]
    fn unstaged_input_is_skipped() {
        let work_dir = blocked_work_dir("skip");
        let config = CampaignConfig {
            method: Method::Random,
            budget: 5,
            work_dir: work_dir.clone(),
            verbose: false,
        };
        let backend = Backend::Unavailable;
        let mut exec = Alternating(1);
        {
            let mut campaign = Campaign::new(
                config,
                Corpus::with_seeds(default_seeds()),
                &backend,
                &mut exec,
                SmallRng::seed_from_u64(42),
            );
            let input = candidate! {"age" => -1};
            assert!(!campaign.execute_one(input.clone()));
            assert_eq!(campaign.tests, 0);
            assert!(campaign.crashes.is_empty());
            assert_eq!(campaign.corpus.len(), 8);

            fs::remove_dir(work_dir.join("test_random_1.json")).unwrap();
            assert!(campaign.execute_one(input));
            assert_eq!(campaign.tests, 1);
            assert_eq!(campaign.crashes.len(), 1);
            assert!(work_dir.join("test_random_1.json").is_file());
        }
        // only the staged input reached the target
        assert_eq!(exec.0, 2);
        fs::remove_dir_all(&work_dir).unwrap();
    }

    #[test]
    fn persistent_staging_failure_aborts() {
        let work_dir = blocked_work_dir("abort");
        let config = CampaignConfig {
            method: Method::Random,
            budget: 5,
            work_dir: work_dir.clone(),
            verbose: false,
        };
        let mut exec = Alternating(0);
        let ret = Campaign::new(
            config,
            Corpus::with_seeds(default_seeds()),
            &Backend::Unavailable,
            &mut exec,
            SmallRng::seed_from_u64(43),
        )
        .run();
        let err = ret.err().unwrap().to_string();
        assert!(err.contains("failed to stage"));
        assert!(err.contains(&MAX_STAGE_FAILURES.to_string()));
        assert_eq!(exec.0, 0);
        fs::remove_dir_all(&work_dir).unwrap();
    }
}
