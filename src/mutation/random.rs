//! Uninformed mutation, one random operator per output.
use crate::{
    candidate::{repeat_capped, Candidate, Value},
    RngType,
};
use rand::prelude::*;

/// Outputs per parent.
pub const BATCH_SIZE: usize = 10;

type MutateOperation = fn(&mut RngType, &mut Candidate);

/// Operators, chosen uniformly.
const OPERATIONS: [MutateOperation; 5] = [
    flip_value,
    add_field,
    delete_field,
    scale_values,
    insert_special_chars,
];

const FLIP_SUFFIXES: [&str; 5] = ["!", "@", "#", ";;;", "|||"];
const FLIP_FACTORS: [i64; 4] = [-1, 0, 100, 1000];
const NEW_KEYS: [&str; 5] = ["test", "data", "permissions", "rating", "extra"];
const SPECIAL_CHARS: [&str; 8] = [";", "|", "&", "\x00", "\n", "\r", "$()", "&&"];

pub fn mutate(rng: &mut RngType, parent: &Candidate) -> Vec<Candidate> {
    (0..BATCH_SIZE)
        .map(|_| {
            let mut c = parent.clone();
            let op = OPERATIONS.choose(rng).unwrap();
            op(rng, &mut c);
            c
        })
        .collect()
}

/// Pick one field: strings get a suffix, integers a multiplier.
pub fn flip_value(rng: &mut RngType, c: &mut Candidate) {
    let key = match c.keys().choose(rng) {
        Some(k) => k.to_string(),
        None => return,
    };
    if let Some(val) = c.get_mut(&key) {
        match val {
            Value::Str(s) => s.push_str(FLIP_SUFFIXES.choose(rng).unwrap()),
            Value::Int(v) => *v = v.saturating_mul(*FLIP_FACTORS.choose(rng).unwrap()),
            Value::Seq(_) => (),
        }
    }
}

/// Insert a field from a small pool biased toward dangerous values.
pub fn add_field(rng: &mut RngType, c: &mut Candidate) {
    let key = *NEW_KEYS.choose(rng).unwrap();
    let val = match rng.gen_range(0..6) {
        0 => Value::Int(0),
        1 => Value::Int(-1),
        2 => Value::Int(999),
        3 => Value::from(""),
        4 => Value::from("test"),
        _ => Value::Seq(vec!["a".into(), "b".into(), "c".into()]),
    };
    c.insert(key, val);
}

pub fn delete_field(rng: &mut RngType, c: &mut Candidate) {
    let key = match c.keys().choose(rng) {
        Some(k) => k.to_string(),
        None => return,
    };
    c.remove(&key);
}

/// Scale every field: strings repeated 100-500 times, integers times [-100, 1000].
/// String growth stops at `MAX_STR_LEN`.
pub fn scale_values(rng: &mut RngType, c: &mut Candidate) {
    for val in c.values_mut() {
        match val {
            Value::Str(s) => *s = repeat_capped(s, rng.gen_range(100..=500)),
            Value::Int(v) => *v = v.saturating_mul(rng.gen_range(-100..=1000)),
            Value::Seq(_) => (),
        }
    }
}

/// Append one special character sequence to every string field.
pub fn insert_special_chars(rng: &mut RngType, c: &mut Candidate) {
    for val in c.values_mut() {
        match val {
            Value::Str(s) => s.push_str(SPECIAL_CHARS.choose(rng).unwrap()),
            Value::Int(_) | Value::Seq(_) => (),
        }
    }
}
