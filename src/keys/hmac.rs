//! keys/hmac.rs
//! HMAC ipad/opad precomputation.
//!
//! The `hmac` crate performs the pad-and-XOR derivation once at construction
//! and owns the resulting inner/outer states, so every `HmacKey` is fully
//! self-contained: no shared scratch buffers, safe to share across managers.

use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use super::KeyError;
use crate::job::HashAlg;

#[derive(Clone)]
enum HmacVariant {
    Sha1(Hmac<Sha1>),
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
    Md5(Hmac<Md5>),
}

/// Precomputed HMAC state for one (hash algorithm, key) pair.
#[derive(Clone)]
pub struct HmacKey {
    alg: HashAlg,
    mac: HmacVariant,
}

impl HmacKey {
    /// Derive the ipad/opad state for an HMAC-style hash algorithm.
    /// Keys of any length are accepted (hashed down when longer than the
    /// block, zero-padded when shorter), as in RFC 2104.
    pub fn precompute(alg: HashAlg, key: &[u8]) -> Result<Self, KeyError> {
        let bad_key = |_| KeyError::InvalidKeySize {
            alg: "HMAC",
            len: key.len(),
        };
        let mac = match alg {
            HashAlg::HmacSha1 => {
                HmacVariant::Sha1(Hmac::<Sha1>::new_from_slice(key).map_err(bad_key)?)
            }
            HashAlg::HmacSha224 => {
                HmacVariant::Sha224(Hmac::<Sha224>::new_from_slice(key).map_err(bad_key)?)
            }
            HashAlg::HmacSha256 => {
                HmacVariant::Sha256(Hmac::<Sha256>::new_from_slice(key).map_err(bad_key)?)
            }
            HashAlg::HmacSha384 => {
                HmacVariant::Sha384(Hmac::<Sha384>::new_from_slice(key).map_err(bad_key)?)
            }
            HashAlg::HmacSha512 => {
                HmacVariant::Sha512(Hmac::<Sha512>::new_from_slice(key).map_err(bad_key)?)
            }
            HashAlg::HmacMd5 => {
                HmacVariant::Md5(Hmac::<Md5>::new_from_slice(key).map_err(bad_key)?)
            }
            _ => return Err(KeyError::UnsupportedAlgorithm("HMAC precompute")),
        };
        Ok(Self { alg, mac })
    }

    pub fn alg(&self) -> HashAlg {
        self.alg
    }

    /// Compute the full (untruncated) HMAC over `data`. The job layer
    /// truncates to the descriptor-table tag length.
    pub fn compute(&self, data: &[u8]) -> Vec<u8> {
        match &self.mac {
            HmacVariant::Sha1(m) => run(m.clone(), data),
            HmacVariant::Sha224(m) => run(m.clone(), data),
            HmacVariant::Sha256(m) => run(m.clone(), data),
            HmacVariant::Sha384(m) => run(m.clone(), data),
            HmacVariant::Sha512(m) => run(m.clone(), data),
            HmacVariant::Md5(m) => run(m.clone(), data),
        }
    }
}

fn run<M: Mac>(mut mac: M, data: &[u8]) -> Vec<u8> {
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HmacKey({:?})", self.alg)
    }
}
