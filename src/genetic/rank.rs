//! Vulnerability potential ranking of seeds.
use crate::candidate::{Candidate, Value};

/// Characters that hint at injection.
pub const SPECIAL_CHARS: [char; 7] = [';', '|', '&', '$', '\n', '\r', '\0'];
/// Elite set size.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSeed {
    pub seed: Candidate,
    pub score: u64,
}

/// Potential of `seed` to trigger a defect.
pub fn score(seed: &Candidate) -> u64 {
    let mut score = 0;

    for val in seed.values() {
        match val {
            Value::Str(s) => {
                let len = s.chars().count();
                if len > 1000 {
                    score += 10;
                } else if len > 100 {
                    score += 5;
                }
                let specials = SPECIAL_CHARS.iter().filter(|c| s.contains(**c)).count();
                score += 15 * specials as u64;
            }
            Value::Int(v) => {
                if *v < 0 {
                    score += 8;
                }
                if *v == 0 {
                    score += 12;
                }
            }
            Value::Seq(s) => {
                if s.len() > 100 {
                    score += 10;
                } else if s.len() > 50 {
                    score += 5;
                }
            }
        }
    }
    score + 5 * seed.len() as u64
}

/// Score and sort by descending score. Ties keep generation order.
pub fn rank(seeds: Vec<Candidate>) -> Vec<RankedSeed> {
    let mut ranked = seeds
        .into_iter()
        .map(|seed| RankedSeed {
            score: score(&seed),
            seed,
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Elite set: the top `min(TOP_N, len)` ranked seeds.
pub fn select_elite(ranked: Vec<RankedSeed>) -> Vec<Candidate> {
    ranked.into_iter().take(TOP_N).map(|r| r.seed).collect()
}

#[cfg(test)]
mod tests {
    use super::{rank, score, select_elite, TOP_N};
    use crate::candidate::{Candidate, Value};

    #[test]
    fn zero_and_special_char() {
        let seed = candidate! {"rating" => 0, "role" => "admin;"};
        assert_eq!(score(&seed), 12 + 15 + 10);
    }

    #[test]
    fn each_special_char_counts_once() {
        let seed = candidate! {"role" => "a;b;c|\n\0"};
        assert_eq!(score(&seed), 4 * 15 + 5);
    }

    #[test]
    fn length_bonuses() {
        assert_eq!(score(&candidate! {"u" => "A".repeat(1001)}), 10 + 5);
        assert_eq!(score(&candidate! {"u" => "A".repeat(101)}), 5 + 5);
        assert_eq!(score(&candidate! {"u" => "A".repeat(100)}), 5);
        assert_eq!(score(&candidate! {"p" => vec![Value::Int(1); 101]}), 10 + 5);
        assert_eq!(score(&candidate! {"p" => vec![Value::Int(1); 51]}), 5 + 5);
        assert_eq!(score(&candidate! {"age" => -3}), 8 + 5);
        assert_eq!(score(&Candidate::new()), 0);
    }

    #[test]
    fn stable_on_ties() {
        let seeds = vec![
            candidate! {"id" => 1, "age" => 5},
            candidate! {"rating" => 0},
            candidate! {"id" => 2, "age" => 6},
            candidate! {"id" => 3, "age" => 7},
        ];
        let ranked = rank(seeds);
        let scores = ranked.iter().map(|r| r.score).collect::<Vec<_>>();
        assert_eq!(scores, [17, 10, 10, 10]);
        let ids = ranked[1..]
            .iter()
            .map(|r| r.seed.get("id").and_then(Value::as_int).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn elite_size() {
        let seeds = (0..15).map(|i| candidate! {"n" => i}).collect::<Vec<_>>();
        assert_eq!(select_elite(rank(seeds)).len(), TOP_N);
        let seeds = (0..3).map(|i| candidate! {"n" => i}).collect::<Vec<_>>();
        assert_eq!(select_elite(rank(seeds)).len(), 3);
        assert!(select_elite(rank(Vec::new())).is_empty());
    }
}
