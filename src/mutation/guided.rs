//! Pattern guided mutation.
//!
//! Every template overlays one field chosen to provoke a specific defect class
//! in the target: oversized strings, shell delimiters, negative or zero
//! integers and oversized lists. When a model backend is available its
//! suggestions are tried first.
use crate::{
    backend::Backend,
    candidate::{Candidate, Value},
    RngType,
};
use rand::prelude::*;

/// Outputs per parent, one per template.
pub const BATCH_SIZE: usize = 5;

pub type Template = fn(&mut RngType) -> Candidate;

pub const TEMPLATES: [Template; BATCH_SIZE] = [
    oversized_username,
    delimited_role,
    negative_age,
    zero_rating,
    oversized_permissions,
];

const DELIMITED_ROLES: [&str; 4] = ["admin;", "user|", "guest&", "root&&"];

pub fn oversized_username(rng: &mut RngType) -> Candidate {
    let len = rng.gen_range(1001..2000);
    candidate! {"username" => "A".repeat(len)}
}

pub fn delimited_role(rng: &mut RngType) -> Candidate {
    candidate! {"role" => *DELIMITED_ROLES.choose(rng).unwrap()}
}

pub fn negative_age(rng: &mut RngType) -> Candidate {
    candidate! {"age" => rng.gen_range(-1000_i64..=-1)}
}

pub fn zero_rating(_rng: &mut RngType) -> Candidate {
    candidate! {"rating" => 0}
}

pub fn oversized_permissions(rng: &mut RngType) -> Candidate {
    let n = rng.gen_range(101..=200);
    candidate! {"permissions" => vec![Value::from("read"); n]}
}

pub fn mutate(rng: &mut RngType, backend: &Backend, parent: &Candidate) -> Vec<Candidate> {
    let mut overrides = match backend {
        Backend::Available(service) => match service.request_overrides(parent, BATCH_SIZE) {
            Ok(o) => o,
            Err(e) => {
                campaign_debug!("model request failed, using templates: {}", e);
                Vec::new()
            }
        },
        Backend::Unavailable => Vec::new(),
    };
    overrides.truncate(BATCH_SIZE);
    if overrides.len() < BATCH_SIZE {
        let mut templates = TEMPLATES;
        templates.shuffle(rng);
        let shortfall = BATCH_SIZE - overrides.len();
        overrides.extend(templates[..shortfall].iter().map(|t| t(rng)));
    }

    overrides
        .into_iter()
        .map(|o| {
            let mut c = parent.clone();
            c.update(&o);
            c
        })
        .collect()
}

/// Template batch only, in random template order.
pub fn template_mutate(rng: &mut RngType, parent: &Candidate) -> Vec<Candidate> {
    mutate(rng, &Backend::Unavailable, parent)
}
