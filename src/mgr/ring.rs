//! mgr/ring.rs
//! Batching job ring. Jobs accumulate until a lane-width batch is full (or
//! the ring hits capacity), then the whole batch executes oldest-first and
//! completed jobs drain in submission order.

use std::collections::VecDeque;

use crate::constants::RING_CAPACITY;
use crate::job::{CipherMode, HashAlg, Job, JobStatus};
use crate::telemetry::JobCounters;

/// Observable ring state, mostly for callers pacing their submit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    /// No jobs anywhere; `flush` would return `None`.
    Empty,
    /// Jobs queued but no completed batch yet.
    Accepting,
    /// Completed jobs waiting to drain.
    Draining,
}

/// The ring proper. `staging` is the slot handed out by `get_next`; a job
/// only enters the queue on submit, so an abandoned slot costs nothing.
#[derive(Debug, Default)]
pub(crate) struct JobRing {
    staging: Job,
    queued: VecDeque<Job>,
    completed: VecDeque<Job>,
}

impl JobRing {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> RingState {
        if !self.completed.is_empty() {
            RingState::Draining
        } else if !self.queued.is_empty() {
            RingState::Accepting
        } else {
            RingState::Empty
        }
    }

    pub(crate) fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Hand out the staging slot, cleared for filling.
    pub(crate) fn get_next(&mut self) -> &mut Job {
        self.staging.reset();
        &mut self.staging
    }

    /// Move the staging job onto the queue. When the queue reaches `lanes`
    /// jobs (or ring capacity), the batch executes and the oldest completed
    /// job is returned; otherwise the job stays pending and `None` comes back.
    pub(crate) fn submit(&mut self, lanes: usize, counters: &mut JobCounters) -> Option<Job> {
        let mut job = std::mem::take(&mut self.staging);
        job.status = JobStatus::InFlight;
        counters.add_submit();
        self.queued.push_back(job);

        let threshold = lanes.min(RING_CAPACITY).max(1);
        if self.queued.len() >= threshold {
            self.run_batch(counters);
        }
        self.completed.pop_front()
    }

    /// Force the oldest job out: drain a completed job if one waits,
    /// otherwise execute whatever is queued. `None` only when the ring is
    /// empty.
    pub(crate) fn flush(&mut self, counters: &mut JobCounters) -> Option<Job> {
        counters.add_flush();
        if self.completed.is_empty() && !self.queued.is_empty() {
            self.run_batch(counters);
        }
        self.completed.pop_front()
    }

    fn run_batch(&mut self, counters: &mut JobCounters) {
        counters.add_batch();
        while let Some(mut job) = self.queued.pop_front() {
            super::exec::run(&mut job);
            let failed = matches!(job.status, JobStatus::Failed(_));
            let ciphered = if job.cipher_mode != CipherMode::Null && !failed {
                job.buffer.len()
            } else {
                0
            };
            let hashed = if job.hash_alg != HashAlg::Null && !failed {
                job.buffer.len()
            } else {
                0
            };
            counters.add_completion(failed, ciphered, hashed);
            self.completed.push_back(job);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Direction, JobError};

    fn submit_null_job(ring: &mut JobRing, lanes: usize, c: &mut JobCounters) -> Option<Job> {
        let job = ring.get_next();
        job.cipher_mode = CipherMode::Null;
        job.hash_alg = HashAlg::Null;
        job.direction = Direction::Encrypt;
        ring.submit(lanes, c)
    }

    #[test]
    fn batch_executes_at_lane_width() {
        let mut ring = JobRing::new();
        let mut c = JobCounters::default();
        assert!(submit_null_job(&mut ring, 4, &mut c).is_none());
        assert!(submit_null_job(&mut ring, 4, &mut c).is_none());
        assert!(submit_null_job(&mut ring, 4, &mut c).is_none());
        let out = submit_null_job(&mut ring, 4, &mut c);
        assert!(matches!(out, Some(j) if j.status == JobStatus::Completed));
        assert_eq!(c.batches_executed, 1);
        assert_eq!(ring.state(), RingState::Draining);
    }

    #[test]
    fn flush_on_empty_ring_returns_none() {
        let mut ring = JobRing::new();
        let mut c = JobCounters::default();
        assert!(ring.flush(&mut c).is_none());
        assert_eq!(ring.state(), RingState::Empty);
        assert_eq!(c.flushes, 1);
    }

    #[test]
    fn flush_drains_pending_jobs_in_order() {
        let mut ring = JobRing::new();
        let mut c = JobCounters::default();
        for i in 0..3u8 {
            let job = ring.get_next();
            job.buffer = vec![i];
            assert!(ring.submit(8, &mut c).is_none());
        }
        for i in 0..3u8 {
            let job = ring.flush(&mut c).unwrap();
            assert_eq!(job.buffer, vec![i]);
            assert_eq!(job.status, JobStatus::Completed);
        }
        assert!(ring.flush(&mut c).is_none());
    }

    #[test]
    fn failed_jobs_still_complete_through_the_ring() {
        let mut ring = JobRing::new();
        let mut c = JobCounters::default();
        let job = ring.get_next();
        job.cipher_mode = CipherMode::Cbc;
        // no keys attached
        assert!(ring.submit(8, &mut c).is_none());
        let out = ring.flush(&mut c).unwrap();
        assert!(matches!(
            out.status,
            JobStatus::Failed(JobError::MissingKeys(_))
        ));
        assert_eq!(c.jobs_failed, 1);
    }
}
