use crate::{
    candidate::Candidate,
    coverage::{classify, BugKind},
};
use serde::Serialize;

/// How many of the latest crashes feed back into breeding.
pub const RECENT_CRASHES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrashRecord {
    /// Sequence number of the test that crashed.
    pub test_no: u64,
    pub input: Candidate,
    pub output: String,
    /// Categories whose markers appear in `output`, possibly none.
    pub kinds: Vec<BugKind>,
}

/// Append-only crash list of one campaign, kept in test order.
#[derive(Debug, Clone, Default)]
pub struct Crashes {
    records: Vec<CrashRecord>,
}

impl Crashes {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&mut self, test_no: u64, input: Candidate, output: String) -> &CrashRecord {
        debug_assert!(self.records.last().map_or(true, |r| r.test_no < test_no));
        let kinds = classify(&output);
        self.records.push(CrashRecord {
            test_no,
            input,
            output,
            kinds,
        });
        &self.records[self.records.len() - 1]
    }

    /// The latest `RECENT_CRASHES` crashes, oldest first.
    pub fn recent(&self) -> &[CrashRecord] {
        let start = self.records.len().saturating_sub(RECENT_CRASHES);
        &self.records[start..]
    }

    pub fn into_records(self) -> Vec<CrashRecord> {
        self.records
    }
}
