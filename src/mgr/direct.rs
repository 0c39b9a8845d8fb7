//! mgr/direct.rs
//! Direct (non-job) manager surface: key-schedule generation, one-shot and
//! streaming GCM, and plain hashing. Every entry point validates its
//! arguments before touching any output; a rejected call leaves caller
//! buffers byte-for-byte untouched.
//!
//! Optional references stand in for the null pointers of lower-level APIs:
//! a `None` argument is always a rejection, never a panic.

use super::Manager;
use crate::aead::gcm::{self, GcmContext, GcmKeyData};
use crate::auth;
use crate::job::HashAlg;
use crate::keys::{
    derive_cmac_subkeys, derive_xcbc_subkeys, expand_aes_key, expand_des_key, AesKey, CmacSubkeys,
    DesKey, HmacKey, XcbcSubkeys,
};
use crate::types::{EngineError, EngineResult};

impl Manager {
    fn reject(&mut self, what: &'static str) -> EngineError {
        if cfg!(feature = "safe-param") {
            self.note_validation_reject();
        }
        EngineError::InvalidArgument(what)
    }

    /// Expand a raw AES key into the (encrypt, decrypt) schedule pair.
    pub fn aes_keyexp(&mut self, raw: Option<&[u8]>) -> EngineResult<(AesKey, AesKey)> {
        let raw = raw.ok_or_else(|| self.reject("aes_keyexp: key"))?;
        Ok(expand_aes_key(raw)?)
    }

    /// Expand a raw DES (8-byte) or 3DES (24-byte) key.
    pub fn des_keysched(&mut self, raw: Option<&[u8]>) -> EngineResult<DesKey> {
        let raw = raw.ok_or_else(|| self.reject("des_keysched: key"))?;
        Ok(expand_des_key(raw)?)
    }

    /// Derive CMAC k1/k2 subkeys from an expanded AES-128 schedule.
    pub fn cmac_subkey_gen(&mut self, key: Option<&AesKey>) -> EngineResult<CmacSubkeys> {
        let key = key.ok_or_else(|| self.reject("cmac_subkey_gen: key"))?;
        Ok(derive_cmac_subkeys(key)?)
    }

    /// Derive the three XCBC keys from a raw 16-byte key.
    pub fn xcbc_keyexp(&mut self, raw: Option<&[u8]>) -> EngineResult<XcbcSubkeys> {
        let raw = raw.ok_or_else(|| self.reject("xcbc_keyexp: key"))?;
        Ok(derive_xcbc_subkeys(raw)?)
    }

    /// Precompute the ipad/opad state for an HMAC algorithm.
    pub fn hmac_precompute(&mut self, alg: HashAlg, key: Option<&[u8]>) -> EngineResult<HmacKey> {
        let key = key.ok_or_else(|| self.reject("hmac_precompute: key"))?;
        Ok(HmacKey::precompute(alg, key)?)
    }

    /// Precompute GCM key data (AES schedule plus hash subkey).
    pub fn gcm_precompute(&mut self, raw: Option<&[u8]>) -> EngineResult<GcmKeyData> {
        let raw = raw.ok_or_else(|| self.reject("gcm_precompute: key"))?;
        Ok(gcm::precompute_gcm_key(raw)?)
    }

    /// Plain digest over `input[..len]`, written to the front of
    /// `digest_out`. Only the non-keyed algorithms (SHA family, MD5) apply.
    pub fn hash(
        &mut self,
        alg: HashAlg,
        input: Option<&[u8]>,
        len: usize,
        digest_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let input = match input {
            Some(i) => i,
            None => return Err(self.reject("hash: input")),
        };
        if len > input.len() {
            return Err(self.reject("hash: length"));
        }
        let digest = match auth::hash(alg, &input[..len]) {
            Some(d) => d,
            None => return Err(self.reject("hash: algorithm")),
        };
        let out = match digest_out {
            Some(o) => o,
            None => return Err(self.reject("hash: output")),
        };
        if out.len() < digest.len() {
            return Err(self.reject("hash: output length"));
        }
        out[..digest.len()].copy_from_slice(&digest);
        Ok(())
    }

    /// Digest of exactly one compression-block-sized input.
    pub fn hash_one_block(
        &mut self,
        alg: HashAlg,
        block: Option<&[u8]>,
        digest_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let block = match block {
            Some(b) => b,
            None => return Err(self.reject("hash_one_block: input")),
        };
        let digest = match auth::hash_one_block(alg, block) {
            Some(d) => d,
            None => return Err(self.reject("hash_one_block: block")),
        };
        let out = match digest_out {
            Some(o) => o,
            None => return Err(self.reject("hash_one_block: output")),
        };
        if out.len() < digest.len() {
            return Err(self.reject("hash_one_block: output length"));
        }
        out[..digest.len()].copy_from_slice(&digest);
        Ok(())
    }

    /// Start a streaming GCM message.
    pub fn gcm_init(
        &mut self,
        key: Option<&GcmKeyData>,
        iv: Option<&[u8]>,
        aad: Option<&[u8]>,
    ) -> EngineResult<GcmContext> {
        let key = key.ok_or_else(|| self.reject("gcm_init: key"))?;
        let iv = iv.ok_or_else(|| self.reject("gcm_init: iv"))?;
        let aad = aad.unwrap_or(&[]);
        Ok(GcmContext::init(key, iv, aad)?)
    }

    /// Stream one plaintext chunk through an open GCM encrypt context.
    pub fn gcm_encrypt_update(
        &mut self,
        ctx: Option<&mut GcmContext>,
        src: Option<&[u8]>,
        dst: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (ctx, src, dst) = match (ctx, src, dst) {
            (Some(c), Some(s), Some(d)) => (c, s, d),
            _ => return Err(self.reject("gcm_encrypt_update: argument")),
        };
        ctx.encrypt_update(src, dst)?;
        Ok(())
    }

    /// Stream one ciphertext chunk through an open GCM decrypt context.
    pub fn gcm_decrypt_update(
        &mut self,
        ctx: Option<&mut GcmContext>,
        src: Option<&[u8]>,
        dst: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (ctx, src, dst) = match (ctx, src, dst) {
            (Some(c), Some(s), Some(d)) => (c, s, d),
            _ => return Err(self.reject("gcm_decrypt_update: argument")),
        };
        ctx.decrypt_update(src, dst)?;
        Ok(())
    }

    /// Close a streaming GCM encrypt and emit the tag.
    pub fn gcm_encrypt_finalize(
        &mut self,
        ctx: Option<&mut GcmContext>,
        tag_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (ctx, tag_out) = match (ctx, tag_out) {
            (Some(c), Some(t)) => (c, t),
            _ => return Err(self.reject("gcm_encrypt_finalize: argument")),
        };
        ctx.finalize(tag_out)?;
        Ok(())
    }

    /// Close a streaming GCM decrypt and emit the recomputed tag.
    pub fn gcm_decrypt_finalize(
        &mut self,
        ctx: Option<&mut GcmContext>,
        tag_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (ctx, tag_out) = match (ctx, tag_out) {
            (Some(c), Some(t)) => (c, t),
            _ => return Err(self.reject("gcm_decrypt_finalize: argument")),
        };
        ctx.finalize(tag_out)?;
        Ok(())
    }

    /// One-shot GCM encrypt.
    pub fn gcm_encrypt(
        &mut self,
        key: Option<&GcmKeyData>,
        iv: Option<&[u8]>,
        aad: Option<&[u8]>,
        src: Option<&[u8]>,
        dst: Option<&mut [u8]>,
        tag_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (key, iv, src, dst, tag_out) = match (key, iv, src, dst, tag_out) {
            (Some(k), Some(i), Some(s), Some(d), Some(t)) => (k, i, s, d, t),
            _ => return Err(self.reject("gcm_encrypt: argument")),
        };
        gcm::gcm_encrypt(key, iv, aad.unwrap_or(&[]), src, dst, tag_out)?;
        Ok(())
    }

    /// One-shot GCM decrypt; the recomputed tag is for the caller to compare.
    pub fn gcm_decrypt(
        &mut self,
        key: Option<&GcmKeyData>,
        iv: Option<&[u8]>,
        aad: Option<&[u8]>,
        src: Option<&[u8]>,
        dst: Option<&mut [u8]>,
        tag_out: Option<&mut [u8]>,
    ) -> EngineResult<()> {
        let (key, iv, src, dst, tag_out) = match (key, iv, src, dst, tag_out) {
            (Some(k), Some(i), Some(s), Some(d), Some(t)) => (k, i, s, d, t),
            _ => return Err(self.reject("gcm_decrypt: argument")),
        };
        gcm::gcm_decrypt(key, iv, aad.unwrap_or(&[]), src, dst, tag_out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Arch;
    use crate::mgr::MgrFlags;

    fn mgr() -> Manager {
        Manager::new(Arch::Scalar, MgrFlags::empty())
    }

    #[test]
    fn none_arguments_reject_without_writes() {
        let mut m = mgr();
        let mut out = [0u8; 32];
        assert!(m.hash(HashAlg::Sha256, None, 0, Some(&mut out)).is_err());
        assert!(m
            .hash(HashAlg::Sha256, Some(b"abc"), 3, None)
            .is_err());
        assert_eq!(out, [0u8; 32]);
    }

    #[test]
    fn hash_writes_digest_prefix_only() {
        let mut m = mgr();
        let mut out = [0xEEu8; 40];
        m.hash(HashAlg::Sha256, Some(b"abc"), 3, Some(&mut out))
            .unwrap();
        assert_eq!(
            hex::encode(&out[..32]),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(&out[32..], &[0xEE; 8]);
    }

    #[test]
    fn short_output_buffer_rejects_untouched() {
        let mut m = mgr();
        let mut out = [0u8; 10];
        assert!(m
            .hash(HashAlg::Sha256, Some(b"abc"), 3, Some(&mut out))
            .is_err());
        assert_eq!(out, [0u8; 10]);
    }

    #[test]
    fn rejects_show_up_in_telemetry() {
        let mut m = mgr();
        let _ = m.hash(HashAlg::Sha256, None, 0, None);
        let snap = m.telemetry();
        if cfg!(feature = "safe-param") {
            assert_eq!(snap.validation_rejects, 1);
        } else {
            assert_eq!(snap.validation_rejects, 0);
        }
    }
}
