//! Bug category feedback inferred from target output.
use crate::HashSet;
use serde::Serialize;
use std::fmt;

/// Fixed taxonomy of bug categories the target can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BugKind {
    BufferOverflow,
    Injection,
    LogicError,
    ArrayBounds,
    DivisionByZero,
}

impl BugKind {
    pub const ALL: [BugKind; 5] = [
        BugKind::BufferOverflow,
        BugKind::Injection,
        BugKind::LogicError,
        BugKind::ArrayBounds,
        BugKind::DivisionByZero,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BugKind::BufferOverflow => "buffer_overflow",
            BugKind::Injection => "injection",
            BugKind::LogicError => "logic_error",
            BugKind::ArrayBounds => "array_bounds",
            BugKind::DivisionByZero => "division_by_zero",
        }
    }

    /// Whether `output` carries the marker of this category.
    pub fn matches(self, output: &str) -> bool {
        match self {
            BugKind::BufferOverflow => output.contains("Buffer overflow"),
            BugKind::Injection => output.contains("Command injection"),
            BugKind::LogicError => output.contains("Negative age"),
            BugKind::ArrayBounds => output.contains("Too many permissions"),
            BugKind::DivisionByZero => output.to_lowercase().contains("division"),
        }
    }
}

impl fmt::Display for BugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All categories whose markers appear in `output`.
pub fn classify(output: &str) -> Vec<BugKind> {
    BugKind::ALL
        .iter()
        .copied()
        .filter(|k| k.matches(output))
        .collect()
}

/// Bug categories observed so far in one campaign. Only ever grows.
#[derive(Debug, Default, Clone)]
pub struct Coverage {
    covered: HashSet<BugKind>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge categories found in `output`, return the newly covered ones.
    pub fn observe(&mut self, output: &str) -> Vec<BugKind> {
        classify(output)
            .into_iter()
            .filter(|k| self.covered.insert(*k))
            .collect()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.covered.len()
    }

    /// Covered categories in taxonomy order.
    pub fn covered(&self) -> Vec<BugKind> {
        let mut c = self.covered.iter().copied().collect::<Vec<_>>();
        c.sort_unstable();
        c
    }
}
