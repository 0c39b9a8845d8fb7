//! job.rs
//! Job descriptor: one cipher+authentication unit of work, carrying its own
//! buffer, IV, AAD, key-schedule references, and status. Status only ever
//! moves forward: NotSubmitted -> InFlight -> Completed | Failed.

use std::sync::Arc;

use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::aead::{AeadError, GcmKeyData};
use crate::constants::{AES_BLOCK_SIZE, CCM_IV_LEN, DES_BLOCK_SIZE, GCM_IV_LEN};
use crate::keys::{AesKey, CmacSubkeys, DesKey, HmacKey, XcbcSubkeys};

/// Cipher modes accepted by the job path.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CipherMode {
    Null = 0,
    Cbc = 1,
    Cntr = 2,
    Ecb = 3,
    DocsisSecBpi = 4,
    Des = 5,
    DocsisDes = 6,
    Des3 = 7,
    Gcm = 8,
    Ccm = 9,
}

/// Hash/MAC modes. The `Hmac*` variants authenticate with precomputed
/// ipad/opad state; the `Sha*` variants are plain digests; `Md5` exists for
/// the direct hashing surface only and is rejected in jobs.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HashAlg {
    Null = 0,
    HmacSha1 = 1,
    HmacSha224 = 2,
    HmacSha256 = 3,
    HmacSha384 = 4,
    HmacSha512 = 5,
    HmacMd5 = 6,
    Sha1 = 7,
    Sha224 = 8,
    Sha256 = 9,
    Sha384 = 10,
    Sha512 = 11,
    Md5 = 12,
    AesXcbc = 13,
    AesCmac = 14,
    AesCmacBitlen = 15,
    AesGmac = 16,
    AesCcm = 17,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Whether cipher or hash runs first. AEAD decrypt authenticates before
/// decrypting; everything else is encrypt-then-MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOrder {
    CipherHash,
    HashCipher,
}

/// Fixed chain-order table keyed by (cipher mode, direction).
pub fn chain_order(mode: CipherMode, direction: Direction) -> ChainOrder {
    match (mode, direction) {
        (CipherMode::Null, _) => ChainOrder::HashCipher,
        (CipherMode::Ccm, Direction::Encrypt) => ChainOrder::HashCipher,
        (CipherMode::Ccm, Direction::Decrypt) => ChainOrder::CipherHash,
        (_, Direction::Encrypt) => ChainOrder::CipherHash,
        (_, Direction::Decrypt) => ChainOrder::HashCipher,
    }
}

impl HashAlg {
    /// Authentication tag length in bytes, from the static descriptor table.
    pub fn tag_len(self) -> usize {
        match self {
            HashAlg::Null => 0,
            HashAlg::HmacSha1 => 12,
            HashAlg::HmacSha224 => 14,
            HashAlg::HmacSha256 => 16,
            HashAlg::HmacSha384 => 24,
            HashAlg::HmacSha512 => 32,
            HashAlg::HmacMd5 => 12,
            HashAlg::Sha1 => 20,
            HashAlg::Sha224 => 28,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
            HashAlg::Md5 => 16,
            HashAlg::AesXcbc => 12,
            HashAlg::AesCmac => 16,
            HashAlg::AesCmacBitlen => 4,
            HashAlg::AesGmac => 16,
            HashAlg::AesCcm => 16,
        }
    }

    /// AEAD-only hash modes exist solely as the pair of their cipher mode.
    pub fn is_aead(self) -> bool {
        matches!(self, HashAlg::AesGmac | HashAlg::AesCcm)
    }

    /// True for the multi-buffer hash lanes (HMAC and plain SHA); AES-keyed
    /// MACs batch on the AES lanes instead.
    pub fn uses_hash_lanes(self) -> bool {
        matches!(
            self,
            HashAlg::HmacSha1
                | HashAlg::HmacSha224
                | HashAlg::HmacSha256
                | HashAlg::HmacSha384
                | HashAlg::HmacSha512
                | HashAlg::HmacMd5
                | HashAlg::Sha1
                | HashAlg::Sha224
                | HashAlg::Sha256
                | HashAlg::Sha384
                | HashAlg::Sha512
        )
    }

    /// Decode a numeric hash id, as carried in configs and wire headers.
    pub fn from_raw(raw: u16) -> Result<Self, JobError> {
        Self::try_from(raw)
            .map_err(|_| JobError::UnknownHashAlg(crate::utils::enum_name_or_hex::<Self>(raw)))
    }
}

impl CipherMode {
    /// (min, max, step) of valid key sizes in bytes for sweep-style callers.
    pub fn key_size_range(self) -> (usize, usize, usize) {
        match self {
            CipherMode::Null => (0, 0, 1),
            CipherMode::Cbc | CipherMode::Cntr | CipherMode::Ecb | CipherMode::Gcm => (16, 32, 16),
            CipherMode::DocsisSecBpi | CipherMode::Ccm => (16, 16, 1),
            CipherMode::Des | CipherMode::DocsisDes => (8, 8, 1),
            CipherMode::Des3 => (24, 24, 1),
        }
    }

    /// Exact key-size validity (the range table is for sweeps; AES modes also
    /// accept 192-bit keys).
    pub fn key_size_ok(self, len: usize) -> bool {
        match self {
            CipherMode::Null => true,
            CipherMode::Cbc | CipherMode::Cntr | CipherMode::Ecb | CipherMode::Gcm => {
                matches!(len, 16 | 24 | 32)
            }
            CipherMode::DocsisSecBpi | CipherMode::Ccm => len == 16,
            CipherMode::Des | CipherMode::DocsisDes => len == 8,
            CipherMode::Des3 => len == 24,
        }
    }

    /// Required IV length in bytes.
    pub fn iv_len(self) -> usize {
        match self {
            CipherMode::Null | CipherMode::Ecb => 0,
            CipherMode::Cbc | CipherMode::Cntr | CipherMode::DocsisSecBpi => 16,
            CipherMode::Des | CipherMode::DocsisDes | CipherMode::Des3 => 8,
            CipherMode::Gcm => GCM_IV_LEN,
            CipherMode::Ccm => CCM_IV_LEN,
        }
    }

    /// Block alignment the mode demands of the job buffer, if any.
    pub fn required_alignment(self) -> Option<usize> {
        match self {
            CipherMode::Cbc | CipherMode::Ecb => Some(AES_BLOCK_SIZE),
            CipherMode::Des | CipherMode::Des3 => Some(DES_BLOCK_SIZE),
            _ => None,
        }
    }

    pub fn is_aead(self) -> bool {
        matches!(self, CipherMode::Gcm | CipherMode::Ccm)
    }

    /// Decode a numeric mode id, as carried in configs and wire headers.
    pub fn from_raw(raw: u16) -> Result<Self, JobError> {
        Self::try_from(raw)
            .map_err(|_| JobError::UnknownCipherMode(crate::utils::enum_name_or_hex::<Self>(raw)))
    }

    /// The only hash mode a cipher mode may be paired with, when restricted.
    pub fn required_hash(self) -> Option<HashAlg> {
        match self {
            CipherMode::Gcm => Some(HashAlg::AesGmac),
            CipherMode::Ccm => Some(HashAlg::AesCcm),
            _ => None,
        }
    }
}

/// Why a job was rejected or failed. Carried inside `JobStatus::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("cipher mode {cipher:?} cannot pair with hash {hash:?}")]
    UnsupportedCombination { cipher: CipherMode, hash: HashAlg },

    #[error("invalid key size for {mode:?}: {len} bytes")]
    InvalidKeySize { mode: CipherMode, len: usize },

    #[error("invalid IV length for {mode:?}: {len} bytes (expected {expected})")]
    InvalidIvLength {
        mode: CipherMode,
        len: usize,
        expected: usize,
    },

    #[error("invalid tag length {len} for {hash:?}")]
    InvalidTagLength { hash: HashAlg, len: usize },

    #[error("buffer length {len} not a multiple of the {mode:?} block size")]
    UnalignedBuffer { mode: CipherMode, len: usize },

    #[error("job is missing key material for {0}")]
    MissingKeys(&'static str),

    #[error("aead failure: {0}")]
    Aead(#[from] AeadError),

    #[error("unknown cipher mode id {0}")]
    UnknownCipherMode(String),

    #[error("unknown hash algorithm id {0}")]
    UnknownHashAlg(String),
}

/// Job lifecycle. Regression (e.g. Completed back to InFlight) is a bug; the
/// ring only ever moves a status forward.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    NotSubmitted,
    InFlight,
    Completed,
    Failed(JobError),
}

/// Cipher key material referenced by a job. AEAD modes carry the combined
/// precomputed key data instead of an (enc, dec) schedule pair.
#[derive(Debug, Clone, Default)]
pub enum CipherKeys {
    #[default]
    None,
    Aes {
        enc: Arc<AesKey>,
        dec: Arc<AesKey>,
    },
    Des(Arc<DesKey>),
    Gcm(Arc<GcmKeyData>),
}

/// Authentication key material referenced by a job. AEAD and plain-digest
/// modes need none.
#[derive(Debug, Clone, Default)]
pub enum AuthKeys {
    #[default]
    None,
    Hmac(Arc<HmacKey>),
    Xcbc(Arc<XcbcSubkeys>),
    Cmac(Arc<CmacSubkeys>),
}

/// One unit of work. The buffer is processed in place; the tag field receives
/// the computed authentication tag (also on decrypt, for caller comparison).
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub cipher_mode: CipherMode,
    pub hash_alg: HashAlg,
    pub direction: Direction,
    pub chain_order: ChainOrder,
    /// In-place source/destination buffer.
    pub buffer: Vec<u8>,
    pub iv: Vec<u8>,
    /// AAD, AEAD modes only.
    pub aad: Vec<u8>,
    /// Tag output; sized to `tag_len` by the engine on completion.
    pub tag: Vec<u8>,
    /// Requested tag length; 0 means "descriptor-table default".
    pub tag_len: usize,
    pub cipher_keys: CipherKeys,
    pub auth_keys: AuthKeys,
    pub status: JobStatus,
}

impl Default for CipherMode {
    fn default() -> Self {
        CipherMode::Null
    }
}

impl Default for HashAlg {
    fn default() -> Self {
        HashAlg::Null
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Encrypt
    }
}

impl Default for ChainOrder {
    fn default() -> Self {
        ChainOrder::CipherHash
    }
}

impl Job {
    /// Effective tag length: explicit request or the descriptor-table value.
    pub fn effective_tag_len(&self) -> usize {
        if self.tag_len != 0 {
            self.tag_len
        } else {
            self.hash_alg.tag_len()
        }
    }

    /// Clear a slot for reuse, dropping buffers and key references.
    pub(crate) fn reset(&mut self) {
        *self = Job::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order_table_matches_contract() {
        assert_eq!(
            chain_order(CipherMode::Cbc, Direction::Encrypt),
            ChainOrder::CipherHash
        );
        assert_eq!(
            chain_order(CipherMode::Cbc, Direction::Decrypt),
            ChainOrder::HashCipher
        );
        assert_eq!(
            chain_order(CipherMode::Ccm, Direction::Encrypt),
            ChainOrder::HashCipher
        );
        assert_eq!(
            chain_order(CipherMode::Ccm, Direction::Decrypt),
            ChainOrder::CipherHash
        );
        assert_eq!(
            chain_order(CipherMode::Null, Direction::Encrypt),
            ChainOrder::HashCipher
        );
        assert_eq!(
            chain_order(CipherMode::Null, Direction::Decrypt),
            ChainOrder::HashCipher
        );
    }

    #[test]
    fn aead_pairings_are_exclusive() {
        assert_eq!(CipherMode::Gcm.required_hash(), Some(HashAlg::AesGmac));
        assert_eq!(CipherMode::Ccm.required_hash(), Some(HashAlg::AesCcm));
        assert_eq!(CipherMode::Cbc.required_hash(), None);
    }

    #[test]
    fn raw_id_decode() {
        assert_eq!(CipherMode::from_raw(1).unwrap(), CipherMode::Cbc);
        assert_eq!(HashAlg::from_raw(14).unwrap(), HashAlg::AesCmac);
        let err = CipherMode::from_raw(0xbeef).unwrap_err();
        assert!(matches!(err, JobError::UnknownCipherMode(s) if s == "0xbeef"));
    }

    #[test]
    fn tag_table_matches_descriptors() {
        assert_eq!(HashAlg::HmacSha1.tag_len(), 12);
        assert_eq!(HashAlg::Sha1.tag_len(), 20);
        assert_eq!(HashAlg::AesCmacBitlen.tag_len(), 4);
        assert_eq!(HashAlg::Null.tag_len(), 0);
    }
}
