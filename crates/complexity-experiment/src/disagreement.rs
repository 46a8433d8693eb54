//! Disagreement bookkeeping shared by concurrent trials.
//!
//! The log is the only structure mutated from more than one task during a
//! run. Writers take one lock, get an id, append, and release; everything
//! else in a trial is owned by that trial.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use partition_solvers::VariantKind;

/// One variant's verdict inside a disagreeing trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAnswer {
    pub variant: VariantKind,
    pub partitionable: bool,
}

/// Everything needed to replay a disagreeing trial after the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisagreementRecord {
    /// Assigned by the log at append time; unique and dense per run.
    pub id: u64,
    /// Ordered answers, one per executed variant.
    pub answers: Vec<VariantAnswer>,
    /// The deterministically resolved verdict.
    pub trusted_verdict: bool,
    pub set_size: usize,
    pub target_index: usize,
    pub trial: usize,
    pub target_sum: i64,
    /// The offending input, kept verbatim.
    pub input: Vec<i32>,
}

/// Run-scoped, lock-protected list of disagreement records.
#[derive(Debug, Default)]
pub struct DisagreementLog {
    inner: Mutex<LogInner>,
}

#[derive(Debug, Default)]
struct LogInner {
    next_id: u64,
    records: Vec<DisagreementRecord>,
}

impl DisagreementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append under the lock, replacing the record's id with the next one in
    /// sequence. Returns the assigned id.
    pub fn record(&self, mut record: DisagreementRecord) -> u64 {
        let mut inner = self.inner.lock().expect("disagreement log poisoned");
        record.id = inner.next_id;
        inner.next_id += 1;
        let id = record.id;
        inner.records.push(record);
        id
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("disagreement log poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand the accumulated records to the consumer and reset the log.
    pub fn drain(&self) -> Vec<DisagreementRecord> {
        std::mem::take(&mut self.inner.lock().expect("disagreement log poisoned").records)
    }
}
