//! modes/des_modes.rs
//! DES/3DES CBC and the DOCSIS-DES variant (CBC body, CFB residual block).
//! The same schedule drives single DES and EDE; the variant is fixed by the
//! key length at expansion time.

use crate::constants::DES_BLOCK_SIZE;
use crate::keys::DesKey;

fn xor_block(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// CBC encrypt, in place. `buf` length must be a multiple of 8.
pub fn cbc_encrypt(key: &DesKey, iv: &[u8], buf: &mut [u8]) {
    let mut prev = [0u8; DES_BLOCK_SIZE];
    prev.copy_from_slice(iv);
    for block in buf.chunks_mut(DES_BLOCK_SIZE) {
        xor_block(block, &prev);
        key.encrypt_block(block);
        prev.copy_from_slice(block);
    }
}

/// CBC decrypt, in place.
pub fn cbc_decrypt(key: &DesKey, iv: &[u8], buf: &mut [u8]) {
    let mut prev = [0u8; DES_BLOCK_SIZE];
    prev.copy_from_slice(iv);
    for block in buf.chunks_mut(DES_BLOCK_SIZE) {
        let mut ct = [0u8; DES_BLOCK_SIZE];
        ct.copy_from_slice(block);
        key.decrypt_block(block);
        xor_block(block, &prev);
        prev = ct;
    }
}

/// DOCSIS-DES encrypt: CBC over full blocks, CFB residue keyed from the last
/// ciphertext block; short buffers are pure CFB on E(IV).
pub fn docsis_encrypt(key: &DesKey, iv: &[u8], buf: &mut [u8]) {
    let full = buf.len() / DES_BLOCK_SIZE * DES_BLOCK_SIZE;
    if full == 0 {
        let mut ks = [0u8; DES_BLOCK_SIZE];
        ks.copy_from_slice(iv);
        key.encrypt_block(&mut ks);
        xor_block(buf, &ks[..buf.len()]);
        return;
    }
    cbc_encrypt(key, iv, &mut buf[..full]);
    if full < buf.len() {
        let mut ks = [0u8; DES_BLOCK_SIZE];
        ks.copy_from_slice(&buf[full - DES_BLOCK_SIZE..full]);
        key.encrypt_block(&mut ks);
        let tail = &mut buf[full..];
        let n = tail.len();
        xor_block(tail, &ks[..n]);
    }
}

/// DOCSIS-DES decrypt.
pub fn docsis_decrypt(key: &DesKey, iv: &[u8], buf: &mut [u8]) {
    let full = buf.len() / DES_BLOCK_SIZE * DES_BLOCK_SIZE;
    if full == 0 {
        let mut ks = [0u8; DES_BLOCK_SIZE];
        ks.copy_from_slice(iv);
        key.encrypt_block(&mut ks);
        xor_block(buf, &ks[..buf.len()]);
        return;
    }
    if full < buf.len() {
        let mut ks = [0u8; DES_BLOCK_SIZE];
        ks.copy_from_slice(&buf[full - DES_BLOCK_SIZE..full]);
        key.encrypt_block(&mut ks);
        let tail = &mut buf[full..];
        let n = tail.len();
        xor_block(tail, &ks[..n]);
    }
    cbc_decrypt(key, iv, &mut buf[..full]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn des_cbc_round_trips() {
        let key = DesKey::expand(&[0x13u8; 8]).unwrap();
        let iv = [9u8; 8];
        let pt: Vec<u8> = (0..48).map(|i| i as u8).collect();
        let mut buf = pt.clone();
        cbc_encrypt(&key, &iv, &mut buf);
        assert_ne!(buf, pt);
        cbc_decrypt(&key, &iv, &mut buf);
        assert_eq!(buf, pt);
    }

    #[test]
    fn docsis_des_odd_lengths_round_trip() {
        let key = DesKey::expand(&[0x77u8; 8]).unwrap();
        let iv = [3u8; 8];
        for len in [1usize, 7, 8, 9, 23, 40, 41] {
            let pt: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let mut buf = pt.clone();
            docsis_encrypt(&key, &iv, &mut buf);
            docsis_decrypt(&key, &iv, &mut buf);
            assert_eq!(buf, pt);
        }
    }
}
