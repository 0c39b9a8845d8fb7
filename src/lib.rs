//! mb-crypto-core
//!
//! Pure Rust multi-buffer crypto job engine.
//! Batched submit/flush job ring, precomputed key schedules, direct one-shot
//! surface. No FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Capability detection and backend binding
pub mod arch;

// Primitives
pub mod aead;
pub mod auth;
pub mod keys;
pub mod modes;

// Job engine
pub mod job;
pub mod mgr;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::arch::{Arch, Features};
    pub use crate::job::{
        AuthKeys, ChainOrder, CipherKeys, CipherMode, Direction, HashAlg, Job, JobError, JobStatus,
    };
    pub use crate::keys::{
        derive_cmac_subkeys, derive_xcbc_subkeys, expand_aes_key, expand_des_key, AesKey,
        CmacSubkeys, DesKey, HmacKey, KeyError, XcbcSubkeys,
    };
    pub use crate::mgr::{Manager, MgrFlags, RingState};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{EngineError, EngineResult};
}
