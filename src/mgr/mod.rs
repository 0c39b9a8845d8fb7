//! mgr
//! The multi-buffer manager: one bound architecture, one job ring, one set of
//! counters. Construction never fails; an unsupported architecture request
//! silently downgrades to the best backend the host can run.

use bitflags::bitflags;

use crate::arch::{Arch, Features};
use crate::job::{Job, JobStatus};
use crate::telemetry::{JobCounters, TelemetrySnapshot};

mod direct;
mod exec;
mod ring;

pub use ring::RingState;

bitflags! {
    /// Manager construction flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MgrFlags: u64 {
        /// Do not bind the SHA-extension hash path even when the CPU has it.
        const SHANI_OFF = 1 << 0;
    }
}

/// One engine instance. Managers are independent; key schedules shared
/// between them must go through `Arc`.
pub struct Manager {
    arch: Arch,
    features: Features,
    shani: bool,
    ring: ring::JobRing,
    counters: JobCounters,
}

impl Manager {
    /// Bind a manager to the requested architecture, downgrading silently
    /// when the host cannot run it. Scalar always binds.
    pub fn new(requested: Arch, flags: MgrFlags) -> Self {
        let mut features = Features::detect();
        if cfg!(feature = "safe-param") {
            features |= Features::SAFE_PARAM;
        }
        let arch = requested.downgrade(features);
        let shani = features.contains(Features::SHANI) && !flags.contains(MgrFlags::SHANI_OFF);
        Self {
            arch,
            features,
            shani,
            ring: ring::JobRing::new(),
            counters: JobCounters::default(),
        }
    }

    /// The architecture actually bound (after any downgrade).
    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn ring_state(&self) -> RingState {
        self.ring.state()
    }

    pub fn queued_jobs(&self) -> usize {
        self.ring.queued_len()
    }

    /// Hash-lane batch width for the bound backend.
    pub fn hash_lanes(&self) -> usize {
        self.arch.hash_lanes(self.shani)
    }

    pub fn aes_lanes(&self) -> usize {
        self.arch.aes_lanes()
    }

    /// Borrow the next job slot for filling. The slot is cleared; a caller
    /// that walks away without submitting loses nothing.
    pub fn get_next_job(&mut self) -> &mut Job {
        self.ring.get_next()
    }

    /// Submit the filled slot. Jobs batch up to the lane width; when a batch
    /// executes, the oldest completed job comes back, otherwise `None`.
    pub fn submit_job(&mut self) -> Option<Job> {
        let lanes = self.batch_lanes();
        self.ring.submit(lanes, &mut self.counters)
    }

    /// Force out the oldest job, executing a partial batch if needed.
    /// `None` only when the ring is empty.
    pub fn flush_job(&mut self) -> Option<Job> {
        self.ring.flush(&mut self.counters)
    }

    /// Drain the whole ring into completion order.
    pub fn flush_all(&mut self) -> Vec<Job> {
        let mut out = Vec::new();
        while let Some(job) = self.flush_job() {
            out.push(job);
        }
        out
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters)
    }

    // The ring batches on the narrower of the two lane widths so neither
    // pipeline stalls behind the other.
    fn batch_lanes(&self) -> usize {
        self.hash_lanes().min(self.aes_lanes())
    }

    pub(crate) fn note_validation_reject(&mut self) {
        self.counters.add_validation_reject();
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("arch", &self.arch)
            .field("shani", &self.shani)
            .field("ring", &self.ring.state())
            .finish()
    }
}

/// Convenience for dropping a completed job's outcome into a `Result`.
pub fn job_outcome(job: &Job) -> Result<(), crate::job::JobError> {
    match &job.status {
        JobStatus::Failed(e) => Err(e.clone()),
        _ => Ok(()),
    }
}
