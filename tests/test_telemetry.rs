// Telemetry counters through the job path, and snapshot serialization.

use std::sync::Arc;

use mb_crypto_core::arch::Arch;
use mb_crypto_core::job::{chain_order, CipherKeys, CipherMode, Direction, HashAlg};
use mb_crypto_core::keys::expand_aes_key;
use mb_crypto_core::mgr::{Manager, MgrFlags};
use mb_crypto_core::telemetry::TelemetrySnapshot;

fn submit_cbc(m: &mut Manager, buf_len: usize) {
    let (enc, dec) = expand_aes_key(&[0x08; 16]).unwrap();
    let job = m.get_next_job();
    job.cipher_mode = CipherMode::Cbc;
    job.hash_alg = HashAlg::Null;
    job.direction = Direction::Encrypt;
    job.chain_order = chain_order(CipherMode::Cbc, Direction::Encrypt);
    job.buffer = vec![0u8; buf_len];
    job.iv = vec![0u8; 16];
    job.cipher_keys = CipherKeys::Aes {
        enc: Arc::new(enc),
        dec: Arc::new(dec),
    };
    m.submit_job();
}

#[test]
fn counters_track_the_job_lifecycle() {
    let mut m = Manager::new(Arch::Scalar, MgrFlags::empty());
    submit_cbc(&mut m, 64);
    submit_cbc(&mut m, 32);

    // an invalid job (unaligned buffer) must count as failed
    submit_cbc(&mut m, 30);
    m.flush_all();

    let snap = m.telemetry();
    assert_eq!(snap.jobs_submitted, 3);
    assert_eq!(snap.jobs_completed, 2);
    assert_eq!(snap.jobs_failed, 1);
    assert_eq!(snap.bytes_ciphered, 96);
    assert!(snap.batches_executed >= 3);
    assert!(snap.sanity_check());
}

#[test]
fn snapshot_round_trips_through_serde() {
    let mut m = Manager::new(Arch::Scalar, MgrFlags::empty());
    submit_cbc(&mut m, 48);
    m.flush_all();

    let snap = m.telemetry();
    let json = serde_json::to_string(&snap).unwrap();
    let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snap, back);
    assert_eq!(back.jobs_submitted, 1);
    assert_eq!(back.bytes_ciphered, 48);
}

#[test]
fn failure_ratio_is_bounded() {
    let mut m = Manager::new(Arch::Scalar, MgrFlags::empty());
    for _ in 0..4 {
        submit_cbc(&mut m, 30); // all unaligned, all fail
    }
    m.flush_all();
    let snap = m.telemetry();
    assert_eq!(snap.jobs_failed, 4);
    assert!((snap.failure_ratio - 1.0).abs() < f64::EPSILON);
    assert!(snap.sanity_check());
}
