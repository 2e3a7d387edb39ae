//! Seed pool generation.
use crate::{backend::Backend, candidate::Candidate, corpus::Corpus, mutation::guided, RngType};

/// Guided batches per generation.
pub const SEED_BATCHES: usize = 3;

/// Base used when the corpus is empty.
pub fn default_base() -> Candidate {
    candidate! {"username" => "test", "role" => "user", "age" => 25}
}

/// `SEED_BATCHES` guided batches of one random corpus member.
pub fn gen_seeds(rng: &mut RngType, backend: &Backend, corpus: &Corpus) -> Vec<Candidate> {
    let base = corpus.select_one(rng).cloned().unwrap_or_else(default_base);
    let mut seeds = Vec::with_capacity(SEED_BATCHES * guided::BATCH_SIZE);
    for _ in 0..SEED_BATCHES {
        seeds.extend(guided::mutate(rng, backend, &base));
    }
    campaign_debug!("generated {} seeds", seeds.len());
    seeds
}

#[cfg(test)]
mod tests {
    use super::{gen_seeds, SEED_BATCHES};
    use crate::{backend::Backend, candidate::Value, corpus::Corpus, mutation::guided};
    use rand::{prelude::SmallRng, SeedableRng};

    #[test]
    fn pool_size() {
        let mut rng = SmallRng::seed_from_u64(31);
        let corpus = Corpus::with_seeds(vec![
            candidate! {"username" => "alice", "role" => "admin", "age" => 25},
            candidate! {"username" => "bob", "role" => "user", "age" => 30},
        ]);
        let seeds = gen_seeds(&mut rng, &Backend::Unavailable, &corpus);
        assert_eq!(seeds.len(), SEED_BATCHES * guided::BATCH_SIZE);
    }

    #[test]
    fn empty_corpus_uses_default_base() {
        let mut rng = SmallRng::seed_from_u64(32);
        let seeds = gen_seeds(&mut rng, &Backend::Unavailable, &Corpus::new());
        assert_eq!(seeds.len(), SEED_BATCHES * guided::BATCH_SIZE);
        // every seed keeps the base fields not overlaid by its template
        let kept = seeds
            .iter()
            .filter(|s| s.get("username") == Some(&Value::from("test")))
            .count();
        assert_eq!(kept, (guided::BATCH_SIZE - 1) * SEED_BATCHES);
        assert!(seeds.iter().all(|s| s.contains_key("role")));
    }
}
