//! auth.rs
//! Authentication-side execution: HMAC, plain digests, AES-XCBC (RFC 3566),
//! AES-CMAC (RFC 4493) and the bit-length CMAC variant used by 3GPP stacks.
//! All functions compute the full tag; truncation happens at the job layer.

use md5::Md5;
use sha1::{Digest, Sha1};
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::constants::AES_BLOCK_SIZE;
use crate::job::HashAlg;
use crate::keys::{AesKey, CmacSubkeys, HmacKey, XcbcSubkeys};

fn xor_block(acc: &mut [u8; AES_BLOCK_SIZE], block: &[u8]) {
    for (a, b) in acc.iter_mut().zip(block) {
        *a ^= b;
    }
}

/// Plain digest of `data` for the direct-hash algorithms.
pub fn hash(alg: HashAlg, data: &[u8]) -> Option<Vec<u8>> {
    let out = match alg {
        HashAlg::Sha1 => Sha1::digest(data).to_vec(),
        HashAlg::Sha224 => Sha224::digest(data).to_vec(),
        HashAlg::Sha256 => Sha256::digest(data).to_vec(),
        HashAlg::Sha384 => Sha384::digest(data).to_vec(),
        HashAlg::Sha512 => Sha512::digest(data).to_vec(),
        HashAlg::Md5 => Md5::digest(data).to_vec(),
        _ => return None,
    };
    Some(out)
}

/// Digest of a single compression-function-sized input block. Callers pass
/// exactly one block (64 bytes, or 128 for SHA-384/512); the input is hashed
/// with standard padding.
pub fn hash_one_block(alg: HashAlg, block: &[u8]) -> Option<Vec<u8>> {
    let expected = match alg {
        HashAlg::Sha1 | HashAlg::Sha224 | HashAlg::Sha256 | HashAlg::Md5 => {
            crate::constants::block_len::SHA256
        }
        HashAlg::Sha384 | HashAlg::Sha512 => crate::constants::block_len::SHA512,
        _ => return None,
    };
    if block.len() != expected {
        return None;
    }
    hash(alg, block)
}

/// HMAC over `data` using a precomputed key, truncated to `tag_len`.
pub fn hmac_tag(key: &HmacKey, data: &[u8], tag_len: usize) -> Vec<u8> {
    let mut full = key.compute(data);
    full.truncate(tag_len);
    full
}

/// Plain-digest tag for the non-keyed hash job modes.
pub fn digest_tag(alg: HashAlg, data: &[u8], tag_len: usize) -> Option<Vec<u8>> {
    let mut full = hash(alg, data)?;
    full.truncate(tag_len);
    Some(full)
}

/// AES-XCBC-MAC (RFC 3566). The final block is whitened with k2 when
/// complete, or 0x80-padded and whitened with k3. An empty message is one
/// padded block.
pub fn xcbc_tag(keys: &XcbcSubkeys, data: &[u8], tag_len: usize) -> Vec<u8> {
    let mut e = [0u8; AES_BLOCK_SIZE];
    let n_full = if data.is_empty() {
        0
    } else {
        (data.len() - 1) / AES_BLOCK_SIZE
    };
    for i in 0..n_full {
        xor_block(&mut e, &data[i * AES_BLOCK_SIZE..(i + 1) * AES_BLOCK_SIZE]);
        keys.k1.encrypt_block(&mut e);
    }

    let rest = &data[n_full * AES_BLOCK_SIZE..];
    if !data.is_empty() && rest.len() == AES_BLOCK_SIZE {
        xor_block(&mut e, rest);
        xor_block(&mut e, &keys.k2);
    } else {
        let mut last = [0u8; AES_BLOCK_SIZE];
        last[..rest.len()].copy_from_slice(rest);
        last[rest.len()] = 0x80;
        xor_block(&mut e, &last);
        xor_block(&mut e, &keys.k3);
    }
    keys.k1.encrypt_block(&mut e);

    e[..tag_len.min(AES_BLOCK_SIZE)].to_vec()
}

fn cmac_core(key: &AesKey, k1: &[u8; 16], k2: &[u8; 16], last: CmacLast<'_>, body: &[u8]) -> [u8; 16] {
    let mut x = [0u8; AES_BLOCK_SIZE];
    for block in body.chunks_exact(AES_BLOCK_SIZE) {
        xor_block(&mut x, block);
        key.encrypt_block(&mut x);
    }

    let mut m_last = [0u8; AES_BLOCK_SIZE];
    match last {
        CmacLast::Complete(block) => {
            m_last.copy_from_slice(block);
            xor_block(&mut m_last, k1);
        }
        CmacLast::Padded(partial) => {
            m_last[..partial.len()].copy_from_slice(partial);
            m_last[partial.len()] = 0x80;
            xor_block(&mut m_last, k2);
        }
        CmacLast::Raw(block) => {
            m_last.copy_from_slice(block);
        }
    }
    xor_block(&mut x, &m_last);
    key.encrypt_block(&mut x);
    x
}

enum CmacLast<'a> {
    Complete(&'a [u8]),
    Padded(&'a [u8]),
    /// Already padded and whitened by the caller (bit-length variant).
    Raw(&'a [u8; 16]),
}

/// AES-CMAC (RFC 4493).
pub fn cmac_tag(keys: &CmacSubkeys, data: &[u8], tag_len: usize) -> Vec<u8> {
    let t = if data.is_empty() {
        cmac_core(&keys.key, &keys.k1, &keys.k2, CmacLast::Padded(&[]), &[])
    } else {
        let n_full = (data.len() - 1) / AES_BLOCK_SIZE;
        let body = &data[..n_full * AES_BLOCK_SIZE];
        let rest = &data[n_full * AES_BLOCK_SIZE..];
        if rest.len() == AES_BLOCK_SIZE {
            cmac_core(&keys.key, &keys.k1, &keys.k2, CmacLast::Complete(rest), body)
        } else {
            cmac_core(&keys.key, &keys.k1, &keys.k2, CmacLast::Padded(rest), body)
        }
    };
    t[..tag_len.min(AES_BLOCK_SIZE)].to_vec()
}

/// Bit-length CMAC as used by 3GPP integrity: the message spans
/// `8 * data.len() - 4` bits, so the low nibble of the final byte is dropped
/// and bit-level 10* padding lands inside it.
pub fn cmac_bitlen_tag(keys: &CmacSubkeys, data: &[u8], tag_len: usize) -> Vec<u8> {
    if data.is_empty() {
        return cmac_tag(keys, data, tag_len);
    }
    let bits = data.len() * 8 - 4;
    let last_block_bits = {
        let rem = bits % 128;
        if rem == 0 {
            128
        } else {
            rem
        }
    };
    let body_len = data.len() - (last_block_bits + 4) / 8;
    let body = &data[..body_len];
    let rest = &data[body_len..];

    let mut m_last = [0u8; AES_BLOCK_SIZE];
    m_last[..rest.len()].copy_from_slice(rest);
    // Drop the 4 unused bits and place the single padding 1-bit after them.
    // A byte-granular input always leaves the final block partial, so the
    // padded subkey applies unconditionally.
    let idx = rest.len() - 1;
    m_last[idx] &= 0xF0;
    m_last[idx] |= 0x08;
    xor_block(&mut m_last, &keys.k2);
    let t = cmac_core(&keys.key, &keys.k1, &keys.k2, CmacLast::Raw(&m_last), body);
    t[..tag_len.min(AES_BLOCK_SIZE)].to_vec()
}
