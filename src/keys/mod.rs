//! keys
//! Key-schedule subsystem: raw key material expands once into an immutable
//! working schedule, owned by the caller and reused across many jobs.
//! Schedules are cheap to clone and safe to share read-only (wrap in `Arc`
//! when one key serves several managers).

use thiserror::Error;

pub mod aes;
pub mod cmac;
pub mod des;
pub mod hmac;

pub use aes::{expand_aes_key, AesKey};
pub use cmac::{derive_cmac_subkeys, derive_xcbc_subkeys, CmacSubkeys, XcbcSubkeys};
pub use des::{expand_des_key, DesKey};
pub use hmac::HmacKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key length outside the algorithm's valid set; caller must not proceed.
    #[error("invalid {alg} key size: {len} bytes")]
    InvalidKeySize { alg: &'static str, len: usize },

    /// The algorithm does not take precomputed key material of this kind.
    #[error("unsupported algorithm for this schedule: {0}")]
    UnsupportedAlgorithm(&'static str),
}
