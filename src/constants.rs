//! constants.rs
//! Fixed sizes and static descriptor values shared by the engine and callers.

/// AES block size in bytes (CBC/CNTR/ECB/DOCSIS/GCM/CCM all operate on this).
pub const AES_BLOCK_SIZE: usize = 16;
/// DES/3DES block size in bytes.
pub const DES_BLOCK_SIZE: usize = 8;

/// GCM jobs carry a 96-bit IV.
pub const GCM_IV_LEN: usize = 12;
/// CCM jobs carry a 13-byte nonce (L = 2).
pub const CCM_IV_LEN: usize = 13;
/// L = 2 bounds the CCM message length field to two bytes.
pub const CCM_MAX_MSG_LEN: usize = 0xFFFF;
/// Largest AAD representable with the two-byte RFC 3610 length encoding.
pub const CCM_MAX_AAD_LEN: usize = 0xFEFF;

/// Largest digest produced by any supported hash (SHA-512).
pub const MAX_DIGEST_SIZE: usize = 64;
/// Largest hash input block (SHA-384/512 block size); HMAC keys are padded to
/// the hash's block length, so this also bounds raw HMAC key material.
pub const MAX_BLOCK_SIZE: usize = 128;

/// Valid AES raw key lengths in bytes.
pub const AES_KEY_LENS: &[usize] = &[16, 24, 32];
/// DES raw key length in bytes.
pub const DES_KEY_LEN: usize = 8;
/// 3DES raw key length in bytes (three DES keys, EDE).
pub const DES3_KEY_LEN: usize = 24;

/// Job ring capacity: one full batch at the widest lane count (AVX-512, 16).
pub const RING_CAPACITY: usize = 16;

/// Hash input block lengths in bytes, keyed by algorithm family.
pub mod block_len {
    pub const SHA1: usize = 64;
    pub const SHA256: usize = 64; // also SHA-224
    pub const SHA512: usize = 128; // also SHA-384
    pub const MD5: usize = 64;
}
