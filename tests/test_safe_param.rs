// Parameter-validation contract for the direct surface: a rejected call is a
// no-op, with every caller-visible output buffer byte-for-byte untouched.
// Each scenario runs twice: once with only invalid calls, once interleaved
// with valid ones to prove rejection does not poison later calls.

#![cfg(feature = "safe-param")]

use mb_crypto_core::aead::precompute_gcm_key;
use mb_crypto_core::arch::Arch;
use mb_crypto_core::job::HashAlg;
use mb_crypto_core::mgr::{Manager, MgrFlags};

fn mgr() -> Manager {
    Manager::new(Arch::Scalar, MgrFlags::empty())
}

fn assert_zeroed(buf: &[u8], what: &str) {
    assert!(buf.iter().all(|&b| b == 0), "{what} was written");
}

#[test]
fn all_invalid_hash_calls_leave_outputs_zeroed() {
    let mut m = mgr();
    let mut digest = [0u8; 64];

    assert!(m.hash(HashAlg::Sha256, None, 0, Some(&mut digest)).is_err());
    assert!(m
        .hash(HashAlg::Sha256, Some(b"abcd"), 99, Some(&mut digest))
        .is_err());
    assert!(m
        .hash(HashAlg::HmacSha256, Some(b"abcd"), 4, Some(&mut digest))
        .is_err()); // keyed algorithm on the plain-hash surface
    assert!(m
        .hash_one_block(HashAlg::Sha256, Some(&[0u8; 63]), Some(&mut digest))
        .is_err());
    assert!(m
        .hash_one_block(HashAlg::Sha512, Some(&[0u8; 64]), Some(&mut digest))
        .is_err()); // SHA-512 blocks are 128 bytes

    assert_zeroed(&digest, "digest");
    assert_eq!(m.telemetry().validation_rejects, 5);
}

#[test]
fn mixed_valid_and_invalid_calls() {
    let mut m = mgr();
    let mut good = [0u8; 32];
    let mut poisoned = [0u8; 32];

    assert!(m.hash(HashAlg::Sha256, None, 0, Some(&mut poisoned)).is_err());
    m.hash(HashAlg::Sha256, Some(b"abc"), 3, Some(&mut good))
        .unwrap();
    assert!(m
        .hash(HashAlg::Sha256, Some(b"abc"), 4, Some(&mut poisoned))
        .is_err());

    assert_zeroed(&poisoned, "rejected output");
    assert_eq!(
        hex::encode(good),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn gcm_direct_calls_validate_before_writing() {
    let mut m = mgr();
    let key = precompute_gcm_key(&[0x11; 16]).unwrap();
    let src = [0x22u8; 24];
    let mut dst = [0u8; 24];
    let mut tag = [0u8; 16];

    // all-invalid pass
    assert!(m
        .gcm_encrypt(None, Some(&[0u8; 12]), None, Some(&src), Some(&mut dst), Some(&mut tag))
        .is_err());
    assert!(m
        .gcm_encrypt(Some(&key), Some(&[0u8; 11]), None, Some(&src), Some(&mut dst), Some(&mut tag))
        .is_err());
    assert!(m
        .gcm_encrypt(Some(&key), Some(&[0u8; 12]), None, None, Some(&mut dst), Some(&mut tag))
        .is_err());
    assert_zeroed(&dst, "dst");
    assert_zeroed(&tag, "tag");

    // mixed pass: a valid call still works afterwards
    m.gcm_encrypt(
        Some(&key),
        Some(&[0u8; 12]),
        None,
        Some(&src),
        Some(&mut dst),
        Some(&mut tag),
    )
    .unwrap();
    assert_ne!(dst, src);
    assert!(tag.iter().any(|&b| b != 0));
}

#[test]
fn streaming_gcm_rejects_missing_context() {
    let mut m = mgr();
    let mut dst = [0u8; 8];
    let mut tag = [0u8; 16];
    assert!(m
        .gcm_encrypt_update(None, Some(&[0u8; 8]), Some(&mut dst))
        .is_err());
    assert!(m.gcm_encrypt_finalize(None, Some(&mut tag)).is_err());
    assert_zeroed(&dst, "dst");
    assert_zeroed(&tag, "tag");
}

#[test]
fn key_expansion_rejects_none() {
    let mut m = mgr();
    assert!(m.aes_keyexp(None).is_err());
    assert!(m.des_keysched(None).is_err());
    assert!(m.xcbc_keyexp(None).is_err());
    assert!(m.cmac_subkey_gen(None).is_err());
    assert!(m.gcm_precompute(None).is_err());
    assert!(m.hmac_precompute(HashAlg::HmacSha1, None).is_err());
    assert_eq!(m.telemetry().validation_rejects, 6);
}

#[test]
fn safe_param_feature_is_advertised() {
    let m = mgr();
    assert!(m
        .features()
        .contains(mb_crypto_core::arch::Features::SAFE_PARAM));
}
