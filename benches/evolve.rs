use criterion::{criterion_group, criterion_main, Criterion};
use gafuzz::{
    backend::Backend,
    corpus::{default_seeds, Corpus},
    crash::Crashes,
    genetic::evolve,
    mutation::{guided, random},
    RngType,
};
use rand::SeedableRng;

pub fn bench_mutation(c: &mut Criterion) {
    let corpus = Corpus::with_seeds(default_seeds());
    let mut crashes = Crashes::new();
    let mut rng = RngType::seed_from_u64(0);
    for (i, seed) in default_seeds().into_iter().enumerate() {
        crashes.record(i as u64 + 1, seed, "CRASH: Negative age logic error!".to_string());
    }
    let parent = default_seeds().remove(0);

    c.bench_function("Random", |b| b.iter(|| random::mutate(&mut rng, &parent)));
    c.bench_function("Guided", |b| {
        b.iter(|| guided::template_mutate(&mut rng, &parent))
    });
    c.bench_function("Evolve", |b| {
        b.iter(|| evolve(&mut rng, &Backend::Unavailable, &corpus, &crashes))
    });
}

criterion_group!(benches, bench_mutation);
criterion_main!(benches);
