//! Parent selection and crossover.
use crate::{
    candidate::{repeat_capped, Candidate, Value},
    RngType,
};
use rand::{prelude::*, seq::index::sample};

pub const TOURNAMENT_SIZE: usize = 3;
/// Chance of inheriting each field of the second parent.
const INHERIT_PROB: f64 = 0.5;
/// Chance of one extra mutation on the child.
const MUTATE_PROB: f64 = 0.3;
const INT_FACTORS: [i64; 4] = [-1, 2, 10, 100];

/// Sample `TOURNAMENT_SIZE` distinct members, return the index of the fittest.
/// The first sampled wins ties.
pub fn tournament_select(rng: &mut RngType, scores: &[u64]) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    let amount = TOURNAMENT_SIZE.min(scores.len());
    let mut best: Option<usize> = None;
    for idx in sample(rng, scores.len(), amount).iter() {
        match best {
            Some(b) if scores[b] >= scores[idx] => (),
            _ => best = Some(idx),
        }
    }
    best
}

/// Child starts as `p1`, takes each field of `p2` with even odds, then maybe mutates.
pub fn crossover(rng: &mut RngType, p1: &Candidate, p2: &Candidate) -> Candidate {
    let mut child = p1.clone();
    for (k, v) in p2.iter() {
        if rng.gen_bool(INHERIT_PROB) {
            child.insert(k, v.clone());
        }
    }
    if rng.gen_bool(MUTATE_PROB) {
        mutate_one_field(rng, &mut child);
    }
    child
}

/// Repeat a string 2-10 times or scale an integer, on one random field.
pub fn mutate_one_field(rng: &mut RngType, c: &mut Candidate) {
    let key = match c.keys().choose(rng) {
        Some(k) => k.to_string(),
        None => return,
    };
    if let Some(val) = c.get_mut(&key) {
        match val {
            Value::Str(s) => *s = repeat_capped(s, rng.gen_range(2..=10)),
            Value::Int(v) => *v = v.saturating_mul(*INT_FACTORS.choose(rng).unwrap()),
            Value::Seq(_) => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{crossover, mutate_one_field, tournament_select};
    use crate::candidate::{Value, MAX_STR_LEN};
    use rand::{prelude::SmallRng, SeedableRng};

    #[test]
    fn single_member_tournament() {
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..16 {
            assert_eq!(tournament_select(&mut rng, &[3]), Some(0));
        }
        assert_eq!(tournament_select(&mut rng, &[]), None);
    }

    #[test]
    fn tournament_stays_in_population() {
        let mut rng = SmallRng::seed_from_u64(22);
        let scores = [5, 1, 9, 9, 0, 4, 7];
        for _ in 0..256 {
            let idx = tournament_select(&mut rng, &scores).unwrap();
            assert!(idx < scores.len());
            // winner beats at least two others
            assert!(scores.iter().filter(|s| **s <= scores[idx]).count() >= 3);
        }
    }

    #[test]
    fn tournament_of_three_takes_max() {
        let mut rng = SmallRng::seed_from_u64(23);
        for _ in 0..64 {
            assert_eq!(tournament_select(&mut rng, &[1, 8, 2]), Some(1));
        }
    }

    #[test]
    fn child_fields_from_parents() {
        let mut rng = SmallRng::seed_from_u64(24);
        let p1 = candidate! {"username" => "alice", "age" => 25};
        let p2 = candidate! {"role" => "admin;", "rating" => 0};
        for _ in 0..64 {
            let child = crossover(&mut rng, &p1, &p2);
            assert!(child.contains_key("username") && child.contains_key("age"));
            for k in child.keys() {
                assert!(p1.contains_key(k) || p2.contains_key(k));
            }
        }
    }

    #[test]
    fn one_field_mutation() {
        let mut rng = SmallRng::seed_from_u64(25);
        for _ in 0..64 {
            let mut c = candidate! {"role" => "ab"};
            mutate_one_field(&mut rng, &mut c);
            let len = c.get("role").and_then(Value::as_str).unwrap().len();
            assert!(len >= 4 && len <= 20 && len % 2 == 0);

            let mut c = candidate! {"age" => 3};
            mutate_one_field(&mut rng, &mut c);
            let age = c.get("age").and_then(Value::as_int).unwrap();
            assert!([-3, 6, 30, 300].contains(&age));
        }
    }

    #[test]
    fn repeated_mutation_stays_bounded() {
        let mut rng = SmallRng::seed_from_u64(26);
        let mut c = candidate! {"role" => "admin;"};
        for _ in 0..64 {
            mutate_one_field(&mut rng, &mut c);
        }
        let len = c.get("role").and_then(Value::as_str).unwrap().len();
        assert!(len <= MAX_STR_LEN);
    }
}
