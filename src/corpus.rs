use crate::{candidate::Candidate, RngType};
use anyhow::Context;
use rand::prelude::*;
use std::{fs, path::Path};

/// Live set of candidates of one campaign. Grows monotonically, duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    inputs: Vec<Candidate>,
}

impl Corpus {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seeds(seeds: Vec<Candidate>) -> Self {
        Self { inputs: seeds }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn add(&mut self, c: Candidate) {
        self.inputs.push(c);
    }

    /// Select one candidate uniformly.
    pub fn select_one(&self, rng: &mut RngType) -> Option<&Candidate> {
        self.inputs.choose(rng)
    }

    #[inline]
    pub fn first(&self) -> Option<&Candidate> {
        self.inputs.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.inputs.iter()
    }
}

/// Built-in initial seeds.
pub fn default_seeds() -> Vec<Candidate> {
    [
        ("alice", "admin", 25),
        ("bob", "user", 30),
        ("charlie", "guest", 20),
        ("diana", "moderator", 28),
        ("eve", "user", 22),
        ("frank", "admin", 35),
        ("grace", "user", 27),
        ("henry", "guest", 19),
    ]
    .iter()
    .map(|(name, role, age)| candidate! {"username" => *name, "role" => *role, "age" => *age})
    .collect()
}

/// Load `*.json` seeds under `dir` in file name order. Malformed files are skipped.
pub fn load_seeds<P: AsRef<Path>>(dir: P) -> anyhow::Result<Vec<Candidate>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir: {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut seeds = Vec::with_capacity(paths.len());
    for path in paths {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("failed to read seed {}: {}", path.display(), e);
                continue;
            }
        };
        match Candidate::from_json(&content) {
            Ok(c) => seeds.push(c),
            Err(e) => log::warn!("skipping malformed seed {}: {}", path.display(), e),
        }
    }
    log::info!("loaded {} seeds from {}", seeds.len(), dir.display());
    Ok(seeds)
}
