//! keys/aes.rs
//! AES key expansion for the 128/192/256-bit key sizes.
//!
//! The expanded schedule is opaque to callers: the round keys live inside the
//! `aes` crate's cipher state. The raw key is retained so schedules can be
//! compared for determinism checks and re-expanded across managers.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

use super::KeyError;
use crate::constants::AES_BLOCK_SIZE;

#[derive(Clone)]
enum AesVariant {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

/// Expanded AES schedule. One instance serves either direction; the job layer
/// still carries distinct encrypt/decrypt references because CBC decryption
/// uses the inverse schedule while CNTR reuses the forward one.
#[derive(Clone)]
pub struct AesKey {
    raw: Vec<u8>,
    cipher: AesVariant,
}

impl AesKey {
    /// Expand a raw 16/24/32-byte key.
    pub fn expand(raw: &[u8]) -> Result<Self, KeyError> {
        let cipher = match raw.len() {
            16 => AesVariant::Aes128(Aes128::new(GenericArray::from_slice(raw))),
            24 => AesVariant::Aes192(Aes192::new(GenericArray::from_slice(raw))),
            32 => AesVariant::Aes256(Aes256::new(GenericArray::from_slice(raw))),
            len => return Err(KeyError::InvalidKeySize { alg: "AES", len }),
        };
        Ok(Self {
            raw: raw.to_vec(),
            cipher,
        })
    }

    pub fn key_len(&self) -> usize {
        self.raw.len()
    }

    /// Encrypt one 16-byte block in place. `block` must be exactly one block.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), AES_BLOCK_SIZE);
        let b = GenericArray::from_mut_slice(block);
        match &self.cipher {
            AesVariant::Aes128(c) => c.encrypt_block(b),
            AesVariant::Aes192(c) => c.encrypt_block(b),
            AesVariant::Aes256(c) => c.encrypt_block(b),
        }
    }

    /// Decrypt one 16-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), AES_BLOCK_SIZE);
        let b = GenericArray::from_mut_slice(block);
        match &self.cipher {
            AesVariant::Aes128(c) => c.decrypt_block(b),
            AesVariant::Aes192(c) => c.decrypt_block(b),
            AesVariant::Aes256(c) => c.decrypt_block(b),
        }
    }
}

impl PartialEq for AesKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for AesKey {}

impl std::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "AesKey({} bytes)", self.raw.len())
    }
}

/// Expand a raw key into the (encrypt, decrypt) schedule pair.
pub fn expand_aes_key(raw: &[u8]) -> Result<(AesKey, AesKey), KeyError> {
    let enc = AesKey::expand(raw)?;
    let dec = enc.clone();
    Ok((enc, dec))
}
