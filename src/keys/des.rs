//! keys/des.rs
//! DES and 3DES (EDE) key schedules. 8-byte keys become a single-DES
//! schedule, 24-byte keys a three-key EDE schedule; parity bits are ignored
//! by the underlying cipher.

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};

use super::KeyError;
use crate::constants::DES_BLOCK_SIZE;

#[derive(Clone)]
enum DesVariant {
    Single(Des),
    Triple(TdesEde3),
}

#[derive(Clone)]
pub struct DesKey {
    raw: Vec<u8>,
    cipher: DesVariant,
}

impl DesKey {
    pub fn expand(raw: &[u8]) -> Result<Self, KeyError> {
        let cipher = match raw.len() {
            8 => DesVariant::Single(Des::new(GenericArray::from_slice(raw))),
            24 => DesVariant::Triple(TdesEde3::new(GenericArray::from_slice(raw))),
            len => return Err(KeyError::InvalidKeySize { alg: "DES", len }),
        };
        Ok(Self {
            raw: raw.to_vec(),
            cipher,
        })
    }

    pub fn key_len(&self) -> usize {
        self.raw.len()
    }

    /// Encrypt one 8-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), DES_BLOCK_SIZE);
        let b = GenericArray::from_mut_slice(block);
        match &self.cipher {
            DesVariant::Single(c) => c.encrypt_block(b),
            DesVariant::Triple(c) => c.encrypt_block(b),
        }
    }

    /// Decrypt one 8-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), DES_BLOCK_SIZE);
        let b = GenericArray::from_mut_slice(block);
        match &self.cipher {
            DesVariant::Single(c) => c.decrypt_block(b),
            DesVariant::Triple(c) => c.decrypt_block(b),
        }
    }
}

impl PartialEq for DesKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for DesKey {}

impl std::fmt::Debug for DesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DesKey({} bytes)", self.raw.len())
    }
}

/// Expand a raw DES (8-byte) or 3DES (24-byte) key.
pub fn expand_des_key(raw: &[u8]) -> Result<DesKey, KeyError> {
    DesKey::expand(raw)
}
