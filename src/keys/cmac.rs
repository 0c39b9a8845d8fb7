//! keys/cmac.rs
//! Subkey derivation for AES-CMAC (RFC 4493) and AES-XCBC (RFC 3566).
//!
//! CMAC derives k1/k2 by doubling E_K(0^128) in GF(2^128); XCBC derives three
//! independent keys by encrypting the constants 0x01/0x02/0x03 repeated.

use super::aes::AesKey;
use super::KeyError;
use crate::constants::AES_BLOCK_SIZE;

/// CMAC working material: the expanded AES-128 key plus the two derived
/// subkeys. Shared by the plain and bit-length CMAC variants.
#[derive(Clone, PartialEq, Eq)]
pub struct CmacSubkeys {
    pub(crate) key: AesKey,
    pub(crate) k1: [u8; AES_BLOCK_SIZE],
    pub(crate) k2: [u8; AES_BLOCK_SIZE],
}

impl CmacSubkeys {
    pub fn k1(&self) -> &[u8; AES_BLOCK_SIZE] {
        &self.k1
    }

    pub fn k2(&self) -> &[u8; AES_BLOCK_SIZE] {
        &self.k2
    }
}

impl std::fmt::Debug for CmacSubkeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CmacSubkeys(AES-{})", self.key.key_len() * 8)
    }
}

/// XCBC working material: k1 expanded as an AES key, k2/k3 as raw blocks.
#[derive(Clone, PartialEq, Eq)]
pub struct XcbcSubkeys {
    pub(crate) k1: AesKey,
    pub(crate) k2: [u8; AES_BLOCK_SIZE],
    pub(crate) k3: [u8; AES_BLOCK_SIZE],
}

impl std::fmt::Debug for XcbcSubkeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XcbcSubkeys")
    }
}

/// Doubling in GF(2^128) with the CMAC reduction polynomial.
fn dbl(block: &[u8; AES_BLOCK_SIZE]) -> [u8; AES_BLOCK_SIZE] {
    let mut out = [0u8; AES_BLOCK_SIZE];
    let mut carry = 0u8;
    for i in (0..AES_BLOCK_SIZE).rev() {
        out[i] = (block[i] << 1) | carry;
        carry = block[i] >> 7;
    }
    if carry != 0 {
        out[AES_BLOCK_SIZE - 1] ^= 0x87;
    }
    out
}

/// Derive the CMAC k1/k2 subkeys from an expanded AES-128 schedule.
pub fn derive_cmac_subkeys(key: &AesKey) -> Result<CmacSubkeys, KeyError> {
    if key.key_len() != 16 {
        return Err(KeyError::InvalidKeySize {
            alg: "AES-CMAC",
            len: key.key_len(),
        });
    }
    let mut l = [0u8; AES_BLOCK_SIZE];
    key.encrypt_block(&mut l);
    let k1 = dbl(&l);
    let k2 = dbl(&k1);
    Ok(CmacSubkeys {
        key: key.clone(),
        k1,
        k2,
    })
}

/// Derive the XCBC k1/k2/k3 keys from a raw 16-byte key.
pub fn derive_xcbc_subkeys(raw: &[u8]) -> Result<XcbcSubkeys, KeyError> {
    if raw.len() != 16 {
        return Err(KeyError::InvalidKeySize {
            alg: "AES-XCBC",
            len: raw.len(),
        });
    }
    let key = AesKey::expand(raw)?;

    let mut k1_raw = [0x01u8; AES_BLOCK_SIZE];
    key.encrypt_block(&mut k1_raw);
    let mut k2 = [0x02u8; AES_BLOCK_SIZE];
    key.encrypt_block(&mut k2);
    let mut k3 = [0x03u8; AES_BLOCK_SIZE];
    key.encrypt_block(&mut k3);

    let k1 = AesKey::expand(&k1_raw)?;
    Ok(XcbcSubkeys { k1, k2, k3 })
}
