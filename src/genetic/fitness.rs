use crate::{
    candidate::{Candidate, Value},
    crash::CrashRecord,
};

/// Breeding fitness of `c`: size, type variety and field overlap with `recent` crashes.
pub fn fitness(c: &Candidate, recent: &[CrashRecord]) -> u64 {
    let mut score = 2 * c.len() as u64;

    let has_str = c.values().any(|v| matches!(v, Value::Str(_)));
    let has_int = c.values().any(|v| matches!(v, Value::Int(_)));
    let has_seq = c.values().any(|v| matches!(v, Value::Seq(_)));
    score += 5 * [has_str, has_int, has_seq].iter().filter(|b| **b).count() as u64;

    for crash in recent {
        score += 3 * c.overlap(&crash.input) as u64;
    }
    score
}
