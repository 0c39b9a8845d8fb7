//! types.rs
//! Unified engine error covering key-schedule, AEAD, job, and argument
//! validation failures.
//!
//! - Ergonomic `From<T>` impls enable `?` across the engine.
//! - `InvalidArgument` is the validated-entry-point outcome: the call had no
//!   effect and every caller-visible output buffer is untouched.

use thiserror::Error;

use crate::aead::AeadError;
use crate::job::JobError;
use crate::keys::KeyError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Key expansion / subkey derivation failure.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// GCM/CCM failure outside the job path.
    #[error("aead error: {0}")]
    Aead(#[from] AeadError),

    /// Job descriptor failure (also carried inside `JobStatus::Failed`).
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// A validated entry point rejected its arguments; no output was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type EngineResult<T> = Result<T, EngineError>;
