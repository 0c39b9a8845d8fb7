//! aead
//! Authenticated-encryption primitives: GCM (streaming and one-shot) and CCM.
//!
//! Both directions produce the authentication tag; the decrypt path never
//! verifies internally. Callers compare the recomputed tag against the one
//! carried with the message, which is exactly what the cross-validation flow
//! needs.

use thiserror::Error;

pub mod ccm;
pub mod gcm;

pub use ccm::{ccm_decrypt, ccm_encrypt};
pub use gcm::{gcm_decrypt, gcm_encrypt, precompute_gcm_key, GcmContext, GcmKeyData};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AeadError {
    #[error("invalid IV length {len} (expected {expected})")]
    InvalidIvLength { len: usize, expected: usize },

    #[error("invalid tag length {0}")]
    InvalidTagLength(usize),

    #[error("source and destination lengths differ ({src} vs {dst})")]
    LengthMismatch { src: usize, dst: usize },

    #[error("CCM requires an AES-128 key, got {0} bytes")]
    CcmKeySize(usize),

    #[error("message length {len} exceeds the CCM limit {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("AAD length {len} exceeds the CCM limit {max}")]
    AadTooLong { len: usize, max: usize },
}
