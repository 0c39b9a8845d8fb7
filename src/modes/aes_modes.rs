//! modes/aes_modes.rs
//! AES block modes over the expanded schedule. CBC/ECB require block-aligned
//! buffers (the job layer enforces that); CNTR takes a full 16-byte counter
//! block as IV; DOCSIS-BPI is CBC with a CFB-encrypted residual block.

use crate::constants::AES_BLOCK_SIZE;
use crate::keys::AesKey;

fn xor_block(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// CBC encrypt, in place. `buf` length must be a multiple of 16.
pub fn cbc_encrypt(key: &AesKey, iv: &[u8], buf: &mut [u8]) {
    let mut prev = [0u8; AES_BLOCK_SIZE];
    prev.copy_from_slice(iv);
    for block in buf.chunks_mut(AES_BLOCK_SIZE) {
        xor_block(block, &prev);
        key.encrypt_block(block);
        prev.copy_from_slice(block);
    }
}

/// CBC decrypt, in place, using the inverse schedule.
pub fn cbc_decrypt(key: &AesKey, iv: &[u8], buf: &mut [u8]) {
    let mut prev = [0u8; AES_BLOCK_SIZE];
    prev.copy_from_slice(iv);
    for block in buf.chunks_mut(AES_BLOCK_SIZE) {
        let mut ct = [0u8; AES_BLOCK_SIZE];
        ct.copy_from_slice(block);
        key.decrypt_block(block);
        xor_block(block, &prev);
        prev = ct;
    }
}

/// CTR mode, in place. The IV is the full initial counter block; the counter
/// is incremented as a 128-bit big-endian integer. Encrypt and decrypt are
/// the same operation, always on the forward schedule.
pub fn cntr(key: &AesKey, iv: &[u8], buf: &mut [u8]) {
    let mut counter = [0u8; AES_BLOCK_SIZE];
    counter.copy_from_slice(iv);
    for chunk in buf.chunks_mut(AES_BLOCK_SIZE) {
        let mut ks = counter;
        key.encrypt_block(&mut ks);
        xor_block(chunk, &ks[..chunk.len()]);
        for i in (0..AES_BLOCK_SIZE).rev() {
            counter[i] = counter[i].wrapping_add(1);
            if counter[i] != 0 {
                break;
            }
        }
    }
}

/// ECB encrypt, in place. Block-aligned only.
pub fn ecb_encrypt(key: &AesKey, buf: &mut [u8]) {
    for block in buf.chunks_mut(AES_BLOCK_SIZE) {
        key.encrypt_block(block);
    }
}

/// ECB decrypt, in place.
pub fn ecb_decrypt(key: &AesKey, buf: &mut [u8]) {
    for block in buf.chunks_mut(AES_BLOCK_SIZE) {
        key.decrypt_block(block);
    }
}

/// DOCSIS BPI encrypt: full blocks via CBC, the trailing partial block via
/// CFB keyed from the last ciphertext block. Buffers shorter than one block
/// are pure CFB on E(IV).
pub fn docsis_encrypt(enc: &AesKey, iv: &[u8], buf: &mut [u8]) {
    let full = buf.len() / AES_BLOCK_SIZE * AES_BLOCK_SIZE;
    if full == 0 {
        let mut ks = [0u8; AES_BLOCK_SIZE];
        ks.copy_from_slice(iv);
        enc.encrypt_block(&mut ks);
        xor_block(buf, &ks[..buf.len()]);
        return;
    }
    cbc_encrypt(enc, iv, &mut buf[..full]);
    if full < buf.len() {
        let mut ks = [0u8; AES_BLOCK_SIZE];
        ks.copy_from_slice(&buf[full - AES_BLOCK_SIZE..full]);
        enc.encrypt_block(&mut ks);
        let tail = &mut buf[full..];
        let n = tail.len();
        xor_block(tail, &ks[..n]);
    }
}

/// DOCSIS BPI decrypt. The CFB residue keystream comes from the last CBC
/// ciphertext block, so the tail is undone before the CBC body.
pub fn docsis_decrypt(enc: &AesKey, dec: &AesKey, iv: &[u8], buf: &mut [u8]) {
    let full = buf.len() / AES_BLOCK_SIZE * AES_BLOCK_SIZE;
    if full == 0 {
        let mut ks = [0u8; AES_BLOCK_SIZE];
        ks.copy_from_slice(iv);
        enc.encrypt_block(&mut ks);
        xor_block(buf, &ks[..buf.len()]);
        return;
    }
    if full < buf.len() {
        let mut ks = [0u8; AES_BLOCK_SIZE];
        ks.copy_from_slice(&buf[full - AES_BLOCK_SIZE..full]);
        enc.encrypt_block(&mut ks);
        let tail = &mut buf[full..];
        let n = tail.len();
        xor_block(tail, &ks[..n]);
    }
    cbc_decrypt(dec, iv, &mut buf[..full]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key128() -> AesKey {
        AesKey::expand(&[0x42u8; 16]).unwrap()
    }

    #[test]
    fn docsis_partial_tail_round_trips() {
        let key = key128();
        let iv = [7u8; 16];
        for len in [1usize, 15, 16, 17, 31, 33, 64, 71] {
            let pt: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let mut buf = pt.clone();
            docsis_encrypt(&key, &iv, &mut buf);
            if len >= 16 {
                assert_ne!(buf, pt);
            }
            docsis_decrypt(&key, &key, &iv, &mut buf);
            assert_eq!(buf, pt);
        }
    }

    #[test]
    fn cntr_is_its_own_inverse() {
        let key = key128();
        let iv = [0xa5u8; 16];
        let pt: Vec<u8> = (0..53).map(|i| (i * 3) as u8).collect();
        let mut buf = pt.clone();
        cntr(&key, &iv, &mut buf);
        cntr(&key, &iv, &mut buf);
        assert_eq!(buf, pt);
    }
}
