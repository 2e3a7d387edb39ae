//! Genetic breeding on top of guided seeds.
//!
//! One generation: draw a base from the corpus, expand it into a pool of
//! guided seeds, rank the pool, keep the elite, score the elite against recent
//! crashes and breed offspring by tournament selection and crossover.
use crate::{
    backend::Backend, candidate::Candidate, corpus::Corpus, crash::Crashes, mutation::random,
    RngType,
};

pub mod breed;
pub mod fitness;
pub mod rank;
pub mod seed;

use self::{
    breed::{crossover, tournament_select},
    fitness::fitness,
    rank::{rank, select_elite},
    seed::gen_seeds,
};

/// Offspring per generation.
pub const OFFSPRING: usize = 5;

/// Breed `OFFSPRING` children from `elite`.
pub fn breed(rng: &mut RngType, elite: &[Candidate], crashes: &Crashes) -> Vec<Candidate> {
    let scores = elite
        .iter()
        .map(|s| fitness(s, crashes.recent()))
        .collect::<Vec<_>>();
    let mut offspring = Vec::with_capacity(OFFSPRING);
    for _ in 0..OFFSPRING {
        let (p1, p2) = match (
            tournament_select(rng, &scores),
            tournament_select(rng, &scores),
        ) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => break,
        };
        offspring.push(crossover(rng, &elite[p1], &elite[p2]));
    }
    offspring
}

/// Run one generation.
pub fn evolve(
    rng: &mut RngType,
    backend: &Backend,
    corpus: &Corpus,
    crashes: &Crashes,
) -> Vec<Candidate> {
    let seeds = gen_seeds(rng, backend, corpus);
    evolve_from_seeds(rng, seeds, corpus, crashes)
}

/// Rank, select and breed from a given seed pool.
///
/// An empty elite falls back to random mutation of the first corpus member,
/// or nothing if the corpus is empty too.
pub fn evolve_from_seeds(
    rng: &mut RngType,
    seeds: Vec<Candidate>,
    corpus: &Corpus,
    crashes: &Crashes,
) -> Vec<Candidate> {
    let ranked = rank(seeds);
    if let (Some(top), Some(bottom)) = (ranked.first(), ranked.last()) {
        campaign_debug!(
            "ranked {} seeds, top/lowest score: {}/{}",
            ranked.len(),
            top.score,
            bottom.score
        );
    }
    let elite = select_elite(ranked);
    if elite.is_empty() {
        campaign_debug!("no elite seeds, falling back to random mutation");
        return match corpus.first() {
            Some(c) => random::mutate(rng, c),
            None => Vec::new(),
        };
    }
    let offspring = breed(rng, &elite, crashes);
    campaign_debug!(
        "bred {} offspring from {} elite seeds",
        offspring.len(),
        elite.len()
    );
    offspring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Value;
    use rand::{prelude::SmallRng, SeedableRng};

    fn seeds_corpus() -> Corpus {
        Corpus::with_seeds(vec![
            candidate! {"username" => "alice", "role" => "admin", "age" => 25},
            candidate! {"username" => "bob", "role" => "user", "age" => 30},
        ])
    }

    #[test]
    fn generation_offspring() {
        let mut rng = SmallRng::seed_from_u64(32);
        let corpus = seeds_corpus();
        let mut crashes = Crashes::new();
        crashes.record(1, candidate! {"rating" => 0}, "CRASH: division".to_string());
        for _ in 0..16 {
            let out = evolve(&mut rng, &Backend::Unavailable, &corpus, &crashes);
            assert_eq!(out.len(), OFFSPRING);
        }
        let out = evolve(&mut rng, &Backend::Unavailable, &Corpus::new(), &crashes);
        assert_eq!(out.len(), OFFSPRING);
    }

    #[test]
    fn empty_elite_falls_back() {
        let mut rng = SmallRng::seed_from_u64(33);
        let out = evolve_from_seeds(&mut rng, Vec::new(), &seeds_corpus(), &Crashes::new());
        assert_eq!(out.len(), random::BATCH_SIZE);
        let out = evolve_from_seeds(&mut rng, Vec::new(), &Corpus::new(), &Crashes::new());
        assert!(out.is_empty());
    }

    #[test]
    fn single_elite_breeds_itself() {
        let mut rng = SmallRng::seed_from_u64(34);
        let only = candidate! {"rating" => 0, "role" => "x"};
        let out = breed(&mut rng, &[only.clone()], &Crashes::new());
        assert_eq!(out.len(), OFFSPRING);
        for c in out {
            let mut keys = c.keys().collect::<Vec<_>>();
            keys.sort_unstable();
            assert_eq!(keys, ["rating", "role"]);
            let role = c.get("role").and_then(Value::as_str).unwrap();
            assert!(role.chars().all(|ch| ch == 'x'));
        }
    }
}
