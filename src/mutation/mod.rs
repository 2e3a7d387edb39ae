//! Candidate mutation.
use crate::{
    backend::Backend, candidate::Candidate, corpus::Corpus, crash::Crashes, genetic::evolve,
    RngType,
};
use serde::Serialize;
use std::fmt;

pub mod guided;
pub mod random;

/// Input generation strategy driving one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Random,
    Guided,
    Genetic,
}

impl Method {
    /// All methods, in the order they are compared.
    pub const ALL: [Method; 3] = [Method::Random, Method::Guided, Method::Genetic];

    pub fn name(self) -> &'static str {
        match self {
            Method::Random => "random",
            Method::Guided => "guided",
            Method::Genetic => "genetic",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Produce a batch of new candidates with `method`.
///
/// `parent` feeds `Random` and `Guided`, `Genetic` breeds from the whole
/// `corpus` and `crashes` instead. `parent` itself is never modified.
pub fn mutate(
    method: Method,
    backend: &Backend,
    corpus: &Corpus,
    crashes: &Crashes,
    rng: &mut RngType,
    parent: &Candidate,
) -> Vec<Candidate> {
    match method {
        Method::Random => random::mutate(rng, parent),
        Method::Guided => guided::mutate(rng, backend, parent),
        Method::Genetic => evolve(rng, backend, corpus, crashes),
    }
}
