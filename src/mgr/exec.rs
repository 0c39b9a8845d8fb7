//! mgr/exec.rs
//! Single-job validation and execution. The ring hands jobs here in batch
//! order; a job that fails validation is marked `Failed` with its raw content
//! untouched, so callers can inspect exactly what they submitted.

use crate::aead::{ccm, gcm, AeadError};
use crate::auth;
use crate::constants::{CCM_MAX_AAD_LEN, CCM_MAX_MSG_LEN};
use crate::job::{
    AuthKeys, ChainOrder, CipherKeys, CipherMode, Direction, HashAlg, Job, JobError, JobStatus,
};
use crate::modes::{aes_modes, des_modes};

/// Full digest width of a hash mode, the upper bound for requested tag sizes.
fn full_digest_len(alg: HashAlg) -> usize {
    match alg {
        HashAlg::Null => 0,
        HashAlg::HmacSha1 | HashAlg::Sha1 => 20,
        HashAlg::HmacSha224 | HashAlg::Sha224 => 28,
        HashAlg::HmacSha256 | HashAlg::Sha256 => 32,
        HashAlg::HmacSha384 | HashAlg::Sha384 => 48,
        HashAlg::HmacSha512 | HashAlg::Sha512 => 64,
        HashAlg::HmacMd5 | HashAlg::Md5 => 16,
        HashAlg::AesXcbc | HashAlg::AesCmac | HashAlg::AesCmacBitlen => 16,
        HashAlg::AesGmac | HashAlg::AesCcm => 16,
    }
}

fn validate(job: &Job) -> Result<(), JobError> {
    let mode = job.cipher_mode;
    let hash = job.hash_alg;

    // AEAD pairings are exclusive in both directions, and plain MD5 exists
    // only on the direct hashing surface.
    let bad_pair = || JobError::UnsupportedCombination {
        cipher: mode,
        hash,
    };
    match mode.required_hash() {
        Some(required) if hash != required => return Err(bad_pair()),
        None if hash.is_aead() => return Err(bad_pair()),
        _ => {}
    }
    if hash == HashAlg::Md5 {
        return Err(bad_pair());
    }

    // Cipher key material must be present and of the right shape.
    match (mode, &job.cipher_keys) {
        (CipherMode::Null, _) => {}
        (
            CipherMode::Cbc | CipherMode::Cntr | CipherMode::Ecb,
            CipherKeys::Aes { enc, .. },
        ) => {
            if !mode.key_size_ok(enc.key_len()) {
                return Err(JobError::InvalidKeySize {
                    mode,
                    len: enc.key_len(),
                });
            }
        }
        (CipherMode::DocsisSecBpi | CipherMode::Ccm, CipherKeys::Aes { enc, .. }) => {
            if enc.key_len() != 16 {
                return Err(JobError::InvalidKeySize {
                    mode,
                    len: enc.key_len(),
                });
            }
        }
        (CipherMode::Des | CipherMode::DocsisDes, CipherKeys::Des(k)) => {
            if k.key_len() != 8 {
                return Err(JobError::InvalidKeySize {
                    mode,
                    len: k.key_len(),
                });
            }
        }
        (CipherMode::Des3, CipherKeys::Des(k)) => {
            if k.key_len() != 24 {
                return Err(JobError::InvalidKeySize {
                    mode,
                    len: k.key_len(),
                });
            }
        }
        (CipherMode::Gcm, CipherKeys::Gcm(_)) => {}
        _ => return Err(JobError::MissingKeys("cipher")),
    }

    // Authentication key material likewise.
    match (hash, &job.auth_keys) {
        (
            HashAlg::HmacSha1
            | HashAlg::HmacSha224
            | HashAlg::HmacSha256
            | HashAlg::HmacSha384
            | HashAlg::HmacSha512
            | HashAlg::HmacMd5,
            AuthKeys::Hmac(hk),
        ) => {
            if hk.alg() != hash {
                return Err(JobError::MissingKeys("hmac schedule for another algorithm"));
            }
        }
        (HashAlg::AesXcbc, AuthKeys::Xcbc(_)) => {}
        (HashAlg::AesCmac | HashAlg::AesCmacBitlen, AuthKeys::Cmac(_)) => {}
        (
            HashAlg::Null
            | HashAlg::Sha1
            | HashAlg::Sha224
            | HashAlg::Sha256
            | HashAlg::Sha384
            | HashAlg::Sha512
            | HashAlg::AesGmac
            | HashAlg::AesCcm,
            _,
        ) => {}
        _ => return Err(JobError::MissingKeys("auth")),
    }

    let expected_iv = mode.iv_len();
    if job.iv.len() != expected_iv {
        return Err(JobError::InvalidIvLength {
            mode,
            len: job.iv.len(),
            expected: expected_iv,
        });
    }

    let tag_len = job.effective_tag_len();
    match hash {
        HashAlg::Null => {}
        HashAlg::AesCcm => {
            if tag_len < 4 || tag_len > 16 || tag_len % 2 != 0 {
                return Err(JobError::InvalidTagLength {
                    hash,
                    len: tag_len,
                });
            }
            // L = 2 limits on the message length field and AAD encoding.
            if job.buffer.len() > CCM_MAX_MSG_LEN {
                return Err(AeadError::MessageTooLong {
                    len: job.buffer.len(),
                    max: CCM_MAX_MSG_LEN,
                }
                .into());
            }
            if job.aad.len() > CCM_MAX_AAD_LEN {
                return Err(AeadError::AadTooLong {
                    len: job.aad.len(),
                    max: CCM_MAX_AAD_LEN,
                }
                .into());
            }
        }
        _ => {
            if tag_len == 0 || tag_len > full_digest_len(hash) {
                return Err(JobError::InvalidTagLength {
                    hash,
                    len: tag_len,
                });
            }
        }
    }

    if let Some(align) = mode.required_alignment() {
        if job.buffer.len() % align != 0 {
            return Err(JobError::UnalignedBuffer {
                mode,
                len: job.buffer.len(),
            });
        }
    }

    Ok(())
}

fn cipher_step(job: &mut Job) -> Result<(), JobError> {
    match (&job.cipher_keys, job.cipher_mode) {
        (_, CipherMode::Null) => {}
        (CipherKeys::Aes { enc, dec }, mode) => match (mode, job.direction) {
            (CipherMode::Cbc, Direction::Encrypt) => {
                aes_modes::cbc_encrypt(enc, &job.iv, &mut job.buffer)
            }
            (CipherMode::Cbc, Direction::Decrypt) => {
                aes_modes::cbc_decrypt(dec, &job.iv, &mut job.buffer)
            }
            (CipherMode::Cntr, _) => aes_modes::cntr(enc, &job.iv, &mut job.buffer),
            (CipherMode::Ecb, Direction::Encrypt) => aes_modes::ecb_encrypt(enc, &mut job.buffer),
            (CipherMode::Ecb, Direction::Decrypt) => aes_modes::ecb_decrypt(dec, &mut job.buffer),
            (CipherMode::DocsisSecBpi, Direction::Encrypt) => {
                aes_modes::docsis_encrypt(enc, &job.iv, &mut job.buffer)
            }
            (CipherMode::DocsisSecBpi, Direction::Decrypt) => {
                aes_modes::docsis_decrypt(enc, dec, &job.iv, &mut job.buffer)
            }
            _ => return Err(JobError::MissingKeys("cipher")),
        },
        (CipherKeys::Des(key), mode) => match (mode, job.direction) {
            (CipherMode::Des | CipherMode::Des3, Direction::Encrypt) => {
                des_modes::cbc_encrypt(key, &job.iv, &mut job.buffer)
            }
            (CipherMode::Des | CipherMode::Des3, Direction::Decrypt) => {
                des_modes::cbc_decrypt(key, &job.iv, &mut job.buffer)
            }
            (CipherMode::DocsisDes, Direction::Encrypt) => {
                des_modes::docsis_encrypt(key, &job.iv, &mut job.buffer)
            }
            (CipherMode::DocsisDes, Direction::Decrypt) => {
                des_modes::docsis_decrypt(key, &job.iv, &mut job.buffer)
            }
            _ => return Err(JobError::MissingKeys("cipher")),
        },
        _ => return Err(JobError::MissingKeys("cipher")),
    }
    Ok(())
}

fn hash_step(job: &mut Job) -> Result<(), JobError> {
    let tag_len = job.effective_tag_len();
    let tag = match (job.hash_alg, &job.auth_keys) {
        (HashAlg::Null, _) => return Ok(()),
        (_, AuthKeys::Hmac(hk)) => auth::hmac_tag(hk, &job.buffer, tag_len),
        (_, AuthKeys::Xcbc(keys)) => auth::xcbc_tag(keys, &job.buffer, tag_len),
        (HashAlg::AesCmac, AuthKeys::Cmac(keys)) => auth::cmac_tag(keys, &job.buffer, tag_len),
        (HashAlg::AesCmacBitlen, AuthKeys::Cmac(keys)) => {
            auth::cmac_bitlen_tag(keys, &job.buffer, tag_len)
        }
        (alg, AuthKeys::None) => auth::digest_tag(alg, &job.buffer, tag_len)
            .ok_or(JobError::MissingKeys("auth"))?,
        _ => return Err(JobError::MissingKeys("auth")),
    };
    job.tag = tag;
    Ok(())
}

/// AEAD modes run cipher and tag as one atomic operation rather than two
/// chain steps.
fn run_aead(job: &mut Job) -> Result<(), JobError> {
    let tag_len = job.effective_tag_len();
    let mut tag = vec![0u8; tag_len];
    match (&job.cipher_keys, job.direction) {
        (CipherKeys::Gcm(key), Direction::Encrypt) => {
            gcm::gcm_encrypt_in_place(key, &job.iv, &job.aad, &mut job.buffer, &mut tag)?
        }
        (CipherKeys::Gcm(key), Direction::Decrypt) => {
            gcm::gcm_decrypt_in_place(key, &job.iv, &job.aad, &mut job.buffer, &mut tag)?
        }
        (CipherKeys::Aes { enc, .. }, Direction::Encrypt) => {
            ccm::ccm_encrypt_in_place(enc, &job.iv, &job.aad, &mut job.buffer, &mut tag)?
        }
        (CipherKeys::Aes { enc, .. }, Direction::Decrypt) => {
            ccm::ccm_decrypt_in_place(enc, &job.iv, &job.aad, &mut job.buffer, &mut tag)?
        }
        _ => return Err(JobError::MissingKeys("cipher")),
    }
    job.tag = tag;
    Ok(())
}

fn execute(job: &mut Job) -> Result<(), JobError> {
    if job.cipher_mode.is_aead() {
        return run_aead(job);
    }
    match job.chain_order {
        ChainOrder::CipherHash => {
            cipher_step(job)?;
            hash_step(job)
        }
        ChainOrder::HashCipher => {
            hash_step(job)?;
            cipher_step(job)
        }
    }
}

/// Validate and execute one job, settling its status.
pub(crate) fn run(job: &mut Job) {
    if let Err(e) = validate(job) {
        job.status = JobStatus::Failed(e);
        return;
    }
    match execute(job) {
        Ok(()) => job.status = JobStatus::Completed,
        Err(e) => job.status = JobStatus::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::chain_order;
    use crate::keys::expand_aes_key;
    use std::sync::Arc;

    fn cbc_job(dir: Direction, buf: Vec<u8>) -> Job {
        let (enc, dec) = expand_aes_key(&[0x11; 16]).unwrap();
        Job {
            cipher_mode: CipherMode::Cbc,
            hash_alg: HashAlg::Null,
            direction: dir,
            chain_order: chain_order(CipherMode::Cbc, dir),
            buffer: buf,
            iv: vec![0u8; 16],
            cipher_keys: CipherKeys::Aes {
                enc: Arc::new(enc),
                dec: Arc::new(dec),
            },
            ..Job::default()
        }
    }

    #[test]
    fn cbc_round_trip_through_run() {
        let plain = vec![0xAB; 48];
        let mut j = cbc_job(Direction::Encrypt, plain.clone());
        run(&mut j);
        assert_eq!(j.status, JobStatus::Completed);
        assert_ne!(j.buffer, plain);

        let mut back = cbc_job(Direction::Decrypt, j.buffer);
        run(&mut back);
        assert_eq!(back.status, JobStatus::Completed);
        assert_eq!(back.buffer, plain);
    }

    #[test]
    fn unaligned_cbc_is_rejected_untouched() {
        let buf = vec![0x5A; 30];
        let mut j = cbc_job(Direction::Encrypt, buf.clone());
        run(&mut j);
        assert!(matches!(
            j.status,
            JobStatus::Failed(JobError::UnalignedBuffer { .. })
        ));
        assert_eq!(j.buffer, buf);
    }

    #[test]
    fn gcm_requires_gmac_pairing() {
        let mut j = cbc_job(Direction::Encrypt, vec![0u8; 16]);
        j.cipher_mode = CipherMode::Gcm;
        run(&mut j);
        assert!(matches!(
            j.status,
            JobStatus::Failed(JobError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn oversized_ccm_job_fails_untouched() {
        let (enc, dec) = expand_aes_key(&[0x22; 16]).unwrap();
        let buf = vec![0x33; CCM_MAX_MSG_LEN + 5];
        let mut j = Job {
            cipher_mode: CipherMode::Ccm,
            hash_alg: HashAlg::AesCcm,
            direction: Direction::Encrypt,
            chain_order: chain_order(CipherMode::Ccm, Direction::Encrypt),
            buffer: buf.clone(),
            iv: vec![0u8; 13],
            cipher_keys: CipherKeys::Aes {
                enc: Arc::new(enc),
                dec: Arc::new(dec),
            },
            ..Job::default()
        };
        run(&mut j);
        assert!(matches!(
            j.status,
            JobStatus::Failed(JobError::Aead(AeadError::MessageTooLong { .. }))
        ));
        assert_eq!(j.buffer, buf);
        assert!(j.tag.is_empty());
    }

    #[test]
    fn bad_iv_length_is_rejected() {
        let mut j = cbc_job(Direction::Encrypt, vec![0u8; 16]);
        j.iv = vec![0u8; 12];
        run(&mut j);
        assert!(matches!(
            j.status,
            JobStatus::Failed(JobError::InvalidIvLength { .. })
        ));
    }
}
