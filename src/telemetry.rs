//! telemetry.rs
//! Mutable job counters plus the immutable serde snapshot taken from them.
//!
//! Counters live inside the manager and are bumped on the submit/flush path;
//! a snapshot freezes them for logging or export at any point.

use serde::{Deserialize, Serialize};

/// Deterministic counters collected while the engine runs.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct JobCounters {
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub batches_executed: u64,
    pub flushes: u64,
    pub validation_rejects: u64,
    pub bytes_ciphered: u64,
    pub bytes_hashed: u64,
}

impl JobCounters {
    /// Record a job accepted onto the ring.
    pub fn add_submit(&mut self) {
        self.jobs_submitted += 1;
    }

    /// Record one executed job: its outcome plus the bytes it touched.
    pub fn add_completion(&mut self, failed: bool, ciphered: usize, hashed: usize) {
        if failed {
            self.jobs_failed += 1;
        } else {
            self.jobs_completed += 1;
        }
        self.bytes_ciphered += ciphered as u64;
        self.bytes_hashed += hashed as u64;
    }

    /// Record a batch drained off the ring (lane-full or flush).
    pub fn add_batch(&mut self) {
        self.batches_executed += 1;
    }

    /// Record an explicit flush call, whether or not it drained anything.
    pub fn add_flush(&mut self) {
        self.flushes += 1;
    }

    /// Record a direct-API call rejected by parameter validation.
    pub fn add_validation_reject(&mut self) {
        self.validation_rejects += 1;
    }

    pub fn merge(&mut self, other: &JobCounters) {
        self.jobs_submitted += other.jobs_submitted;
        self.jobs_completed += other.jobs_completed;
        self.jobs_failed += other.jobs_failed;
        self.batches_executed += other.batches_executed;
        self.flushes += other.flushes;
        self.validation_rejects += other.validation_rejects;
        self.bytes_ciphered += other.bytes_ciphered;
        self.bytes_hashed += other.bytes_hashed;
    }
}

/// Immutable counter snapshot with derived ratios, serializable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub batches_executed: u64,
    pub flushes: u64,
    pub validation_rejects: u64,
    pub bytes_ciphered: u64,
    pub bytes_hashed: u64,
    pub failure_ratio: f64,
}

impl TelemetrySnapshot {
    pub fn from(counters: &JobCounters) -> Self {
        let failure_ratio = if counters.jobs_submitted > 0 {
            counters.jobs_failed as f64 / counters.jobs_submitted as f64
        } else {
            0.0
        };
        Self {
            jobs_submitted: counters.jobs_submitted,
            jobs_completed: counters.jobs_completed,
            jobs_failed: counters.jobs_failed,
            batches_executed: counters.batches_executed,
            flushes: counters.flushes,
            validation_rejects: counters.validation_rejects,
            bytes_ciphered: counters.bytes_ciphered,
            bytes_hashed: counters.bytes_hashed,
            failure_ratio,
        }
    }

    /// Internal consistency: every submitted job resolved one way or the
    /// other, and the failure ratio stays in range.
    pub fn sanity_check(&self) -> bool {
        self.jobs_completed + self.jobs_failed <= self.jobs_submitted
            && self.failure_ratio <= 1.0
    }
}
