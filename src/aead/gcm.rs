//! aead/gcm.rs
//! AES-GCM built from the forward AES schedule plus a GHASH key, so the
//! streaming lifecycle (init / update / finalize) and the tag-producing
//! decrypt path can be expressed. A sealed AEAD API cannot: cross-validation
//! needs the tag out of both directions, not a verify-or-fail.

use aes::cipher::KeyInit;
use ghash::universal_hash::UniversalHash;
use ghash::GHash;

use super::AeadError;
use crate::constants::{AES_BLOCK_SIZE, GCM_IV_LEN};
use crate::keys::{AesKey, KeyError};

/// Precomputed GCM key data: the expanded AES schedule and the hash subkey
/// H = E_K(0^128) folded into a ready GHASH instance. One per (key size, key).
#[derive(Clone)]
pub struct GcmKeyData {
    cipher: AesKey,
    ghash: GHash,
}

impl GcmKeyData {
    pub fn key_len(&self) -> usize {
        self.cipher.key_len()
    }
}

impl std::fmt::Debug for GcmKeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GcmKeyData(AES-{})", self.cipher.key_len() * 8)
    }
}

/// Precompute GCM key data from a raw 16/24/32-byte key.
pub fn precompute_gcm_key(raw: &[u8]) -> Result<GcmKeyData, KeyError> {
    let cipher = AesKey::expand(raw)?;
    let mut h = [0u8; AES_BLOCK_SIZE];
    cipher.encrypt_block(&mut h);
    let ghash = GHash::new(aes::Block::from_slice(&h));
    Ok(GcmKeyData { cipher, ghash })
}

/// Streaming GCM state for one message. Created by `init`, fed by the update
/// calls, closed by `finalize` (which emits the tag for either direction).
#[derive(Clone, Debug)]
pub struct GcmContext {
    cipher: AesKey,
    ghash: GHash,
    counter: [u8; AES_BLOCK_SIZE],
    tag_mask: [u8; AES_BLOCK_SIZE],
    // CTR keystream carry-over between updates
    ks: [u8; AES_BLOCK_SIZE],
    ks_used: usize,
    // GHASH partial-block carry-over between updates
    buf: [u8; AES_BLOCK_SIZE],
    buf_len: usize,
    aad_len: u64,
    ct_len: u64,
}

impl GcmContext {
    /// Start a message: fold the AAD into GHASH and set the counter from the
    /// 96-bit IV (J0 = IV || 0^31 || 1).
    pub fn init(key: &GcmKeyData, iv: &[u8], aad: &[u8]) -> Result<Self, AeadError> {
        if iv.len() != GCM_IV_LEN {
            return Err(AeadError::InvalidIvLength {
                len: iv.len(),
                expected: GCM_IV_LEN,
            });
        }
        let mut counter = [0u8; AES_BLOCK_SIZE];
        counter[..GCM_IV_LEN].copy_from_slice(iv);
        counter[AES_BLOCK_SIZE - 1] = 1;

        let mut tag_mask = counter;
        key.cipher.encrypt_block(&mut tag_mask);

        let mut ghash = key.ghash.clone();
        if !aad.is_empty() {
            ghash.update_padded(aad);
        }

        Ok(Self {
            cipher: key.cipher.clone(),
            ghash,
            counter,
            tag_mask,
            ks: [0u8; AES_BLOCK_SIZE],
            ks_used: AES_BLOCK_SIZE,
            buf: [0u8; AES_BLOCK_SIZE],
            buf_len: 0,
            aad_len: aad.len() as u64,
            ct_len: 0,
        })
    }

    /// 32-bit big-endian counter increment over the low word of J.
    fn bump_counter(&mut self) {
        for i in (GCM_IV_LEN..AES_BLOCK_SIZE).rev() {
            self.counter[i] = self.counter[i].wrapping_add(1);
            if self.counter[i] != 0 {
                break;
            }
        }
        self.ks = self.counter;
        self.cipher.encrypt_block(&mut self.ks);
        self.ks_used = 0;
    }

    fn xor_keystream(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            if self.ks_used == AES_BLOCK_SIZE {
                self.bump_counter();
            }
            *b ^= self.ks[self.ks_used];
            self.ks_used += 1;
        }
    }

    /// Feed ciphertext bytes into GHASH, carrying partial blocks across calls.
    fn ghash_feed(&mut self, mut data: &[u8]) {
        if self.buf_len > 0 {
            let take = (AES_BLOCK_SIZE - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
            if self.buf_len == AES_BLOCK_SIZE {
                self.ghash.update(&[aes::Block::clone_from_slice(&self.buf)]);
                self.buf_len = 0;
            }
        }
        let mut chunks = data.chunks_exact(AES_BLOCK_SIZE);
        for chunk in &mut chunks {
            self.ghash.update(&[aes::Block::clone_from_slice(chunk)]);
        }
        let rem = chunks.remainder();
        self.buf[..rem.len()].copy_from_slice(rem);
        self.buf_len = rem.len();
    }

    /// Encrypt a chunk in place and authenticate the produced ciphertext.
    pub fn encrypt_update_in_place(&mut self, buf: &mut [u8]) {
        self.xor_keystream(buf);
        self.ghash_feed(buf);
        self.ct_len += buf.len() as u64;
    }

    /// Authenticate a ciphertext chunk and decrypt it in place.
    pub fn decrypt_update_in_place(&mut self, buf: &mut [u8]) {
        self.ghash_feed(buf);
        self.xor_keystream(buf);
        self.ct_len += buf.len() as u64;
    }

    /// Encrypt `src` into `dst`. Lengths must match.
    pub fn encrypt_update(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(), AeadError> {
        if src.len() != dst.len() {
            return Err(AeadError::LengthMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }
        dst.copy_from_slice(src);
        self.encrypt_update_in_place(dst);
        Ok(())
    }

    /// Decrypt `src` into `dst`. Lengths must match.
    pub fn decrypt_update(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(), AeadError> {
        if src.len() != dst.len() {
            return Err(AeadError::LengthMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }
        dst.copy_from_slice(src);
        self.decrypt_update_in_place(dst);
        Ok(())
    }

    /// Close the message: pad the last ciphertext block, hash the length
    /// block, and write `tag_out.len()` tag bytes (1..=16). The context is
    /// left unchanged, so repeated calls emit the same tag.
    pub fn finalize(&self, tag_out: &mut [u8]) -> Result<(), AeadError> {
        if tag_out.is_empty() || tag_out.len() > AES_BLOCK_SIZE {
            return Err(AeadError::InvalidTagLength(tag_out.len()));
        }
        let mut ghash = self.ghash.clone();
        if self.buf_len > 0 {
            let mut last = [0u8; AES_BLOCK_SIZE];
            last[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
            ghash.update(&[aes::Block::clone_from_slice(&last)]);
        }
        let mut len_block = [0u8; AES_BLOCK_SIZE];
        len_block[..8].copy_from_slice(&(self.aad_len * 8).to_be_bytes());
        len_block[8..].copy_from_slice(&(self.ct_len * 8).to_be_bytes());
        ghash.update(&[aes::Block::clone_from_slice(&len_block)]);

        let digest: [u8; AES_BLOCK_SIZE] = ghash.finalize().into();
        for (i, t) in tag_out.iter_mut().enumerate() {
            *t = digest[i] ^ self.tag_mask[i];
        }
        Ok(())
    }
}

/// One-shot GCM encrypt: `dst` receives the ciphertext, `tag_out` the tag.
pub fn gcm_encrypt(
    key: &GcmKeyData,
    iv: &[u8],
    aad: &[u8],
    src: &[u8],
    dst: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    if src.len() != dst.len() {
        return Err(AeadError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    if tag_out.is_empty() || tag_out.len() > AES_BLOCK_SIZE {
        return Err(AeadError::InvalidTagLength(tag_out.len()));
    }
    let mut ctx = GcmContext::init(key, iv, aad)?;
    ctx.encrypt_update(src, dst)?;
    ctx.finalize(tag_out)
}

/// One-shot GCM decrypt: `dst` receives the plaintext, `tag_out` the
/// recomputed tag. The caller compares tags.
pub fn gcm_decrypt(
    key: &GcmKeyData,
    iv: &[u8],
    aad: &[u8],
    src: &[u8],
    dst: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    if src.len() != dst.len() {
        return Err(AeadError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    if tag_out.is_empty() || tag_out.len() > AES_BLOCK_SIZE {
        return Err(AeadError::InvalidTagLength(tag_out.len()));
    }
    let mut ctx = GcmContext::init(key, iv, aad)?;
    ctx.decrypt_update(src, dst)?;
    ctx.finalize(tag_out)
}

/// In-place encrypt used by the job path (src and dst are the same buffer).
pub(crate) fn gcm_encrypt_in_place(
    key: &GcmKeyData,
    iv: &[u8],
    aad: &[u8],
    buf: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    let mut ctx = GcmContext::init(key, iv, aad)?;
    ctx.encrypt_update_in_place(buf);
    ctx.finalize(tag_out)
}

/// In-place decrypt used by the job path.
pub(crate) fn gcm_decrypt_in_place(
    key: &GcmKeyData,
    iv: &[u8],
    aad: &[u8],
    buf: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    let mut ctx = GcmContext::init(key, iv, aad)?;
    ctx.decrypt_update_in_place(buf);
    ctx.finalize(tag_out)
}
