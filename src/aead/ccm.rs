//! aead/ccm.rs
//! AES-CCM (RFC 3610) over the expanded AES-128 schedule: CBC-MAC for
//! authentication, CTR for confidentiality. L = 2, so the nonce is 13 bytes
//! and messages up to 2^16 - 1 bytes are accepted — ample for the job sizes
//! this engine batches.

use super::AeadError;
use crate::constants::{AES_BLOCK_SIZE, CCM_IV_LEN, CCM_MAX_AAD_LEN, CCM_MAX_MSG_LEN};
use crate::keys::AesKey;

fn check_args(
    key: &AesKey,
    nonce: &[u8],
    aad: &[u8],
    msg_len: usize,
    tag_len: usize,
) -> Result<(), AeadError> {
    if key.key_len() != 16 {
        return Err(AeadError::CcmKeySize(key.key_len()));
    }
    if nonce.len() != CCM_IV_LEN {
        return Err(AeadError::InvalidIvLength {
            len: nonce.len(),
            expected: CCM_IV_LEN,
        });
    }
    if tag_len < 4 || tag_len > 16 || tag_len % 2 != 0 {
        return Err(AeadError::InvalidTagLength(tag_len));
    }
    // L = 2: two-byte message length field, two-byte AAD length encoding.
    if msg_len > CCM_MAX_MSG_LEN {
        return Err(AeadError::MessageTooLong {
            len: msg_len,
            max: CCM_MAX_MSG_LEN,
        });
    }
    if aad.len() > CCM_MAX_AAD_LEN {
        return Err(AeadError::AadTooLong {
            len: aad.len(),
            max: CCM_MAX_AAD_LEN,
        });
    }
    Ok(())
}

/// CBC-MAC over B0, the encoded AAD, and the message, per RFC 3610 §2.2.
fn cbc_mac(key: &AesKey, nonce: &[u8], aad: &[u8], msg: &[u8], tag_len: usize) -> [u8; AES_BLOCK_SIZE] {
    let mut x = [0u8; AES_BLOCK_SIZE];
    x[0] = ((!aad.is_empty() as u8) << 6) | (((tag_len as u8 - 2) / 2) << 3) | 0x01;
    x[1..1 + CCM_IV_LEN].copy_from_slice(nonce);
    x[14..].copy_from_slice(&(msg.len() as u16).to_be_bytes());
    key.encrypt_block(&mut x);

    if !aad.is_empty() {
        // First AAD block carries the 2-byte length prefix.
        let mut block = [0u8; AES_BLOCK_SIZE];
        block[..2].copy_from_slice(&(aad.len() as u16).to_be_bytes());
        let head = aad.len().min(AES_BLOCK_SIZE - 2);
        block[2..2 + head].copy_from_slice(&aad[..head]);
        xor_into(&mut x, &block);
        key.encrypt_block(&mut x);

        for chunk in aad[head..].chunks(AES_BLOCK_SIZE) {
            let mut block = [0u8; AES_BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            xor_into(&mut x, &block);
            key.encrypt_block(&mut x);
        }
    }

    for chunk in msg.chunks(AES_BLOCK_SIZE) {
        let mut block = [0u8; AES_BLOCK_SIZE];
        block[..chunk.len()].copy_from_slice(chunk);
        xor_into(&mut x, &block);
        key.encrypt_block(&mut x);
    }
    x
}

fn xor_into(dst: &mut [u8; AES_BLOCK_SIZE], src: &[u8; AES_BLOCK_SIZE]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// Counter block A_i: flags byte (L - 1), nonce, 16-bit counter.
fn counter_block(key: &AesKey, nonce: &[u8], i: u16) -> [u8; AES_BLOCK_SIZE] {
    let mut a = [0u8; AES_BLOCK_SIZE];
    a[0] = 0x01;
    a[1..1 + CCM_IV_LEN].copy_from_slice(nonce);
    a[14..].copy_from_slice(&i.to_be_bytes());
    key.encrypt_block(&mut a);
    a
}

fn ctr_xor(key: &AesKey, nonce: &[u8], buf: &mut [u8]) {
    for (idx, chunk) in buf.chunks_mut(AES_BLOCK_SIZE).enumerate() {
        let ks = counter_block(key, nonce, (idx + 1) as u16);
        for (b, k) in chunk.iter_mut().zip(ks.iter()) {
            *b ^= k;
        }
    }
}

/// In-place CCM encrypt: `buf` plaintext -> ciphertext, tag into `tag_out`.
pub(crate) fn ccm_encrypt_in_place(
    key: &AesKey,
    nonce: &[u8],
    aad: &[u8],
    buf: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    check_args(key, nonce, aad, buf.len(), tag_out.len())?;
    let mac = cbc_mac(key, nonce, aad, buf, tag_out.len());
    let s0 = counter_block(key, nonce, 0);
    ctr_xor(key, nonce, buf);
    for (i, t) in tag_out.iter_mut().enumerate() {
        *t = mac[i] ^ s0[i];
    }
    Ok(())
}

/// In-place CCM decrypt: `buf` ciphertext -> plaintext, recomputed tag into
/// `tag_out` for the caller to compare.
pub(crate) fn ccm_decrypt_in_place(
    key: &AesKey,
    nonce: &[u8],
    aad: &[u8],
    buf: &mut [u8],
    tag_out: &mut [u8],
) -> Result<(), AeadError> {
    check_args(key, nonce, aad, buf.len(), tag_out.len())?;
    ctr_xor(key, nonce, buf);
    let mac = cbc_mac(key, nonce, aad, buf, tag_out.len());
    let s0 = counter_block(key, nonce, 0);
    for (i, t) in tag_out.iter_mut().enumerate() {
        *t = mac[i] ^ s0[i];
    }
    Ok(())
}

/// One-shot CCM encrypt into a separate destination buffer.
pub fn ccm_encrypt(
    key: &AesKey,
    nonce: &[u8],
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
    check_args(key, nonce, aad, src.len(), tag_out.len())?;
    dst.copy_from_slice(src);
    ccm_encrypt_in_place(key, nonce, aad, dst, tag_out)
}

/// One-shot CCM decrypt into a separate destination buffer.
pub fn ccm_decrypt(
    key: &AesKey,
    nonce: &[u8],
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
    check_args(key, nonce, aad, src.len(), tag_out.len())?;
    dst.copy_from_slice(src);
    ccm_decrypt_in_place(key, nonce, aad, dst, tag_out)
}
