// Property tests: round-trips and determinism over random keys and buffers.

use proptest::prelude::*;

use mb_crypto_core::aead::{gcm_decrypt, gcm_encrypt, precompute_gcm_key};
use mb_crypto_core::auth;
use mb_crypto_core::keys::{derive_cmac_subkeys, expand_aes_key, expand_des_key, AesKey};
use mb_crypto_core::modes::{aes_modes, des_modes};

fn aes_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 16),
        proptest::collection::vec(any::<u8>(), 24),
        proptest::collection::vec(any::<u8>(), 32),
    ]
}

proptest! {
    #[test]
    fn cbc_round_trips(
        key in aes_key_strategy(),
        iv in proptest::collection::vec(any::<u8>(), 16),
        blocks in 1usize..8,
        seed in any::<u8>(),
    ) {
        let (enc, dec) = expand_aes_key(&key).unwrap();
        let plain: Vec<u8> = (0..blocks * 16).map(|i| (i as u8).wrapping_add(seed)).collect();
        let mut buf = plain.clone();
        aes_modes::cbc_encrypt(&enc, &iv, &mut buf);
        prop_assert_ne!(&buf, &plain);
        aes_modes::cbc_decrypt(&dec, &iv, &mut buf);
        prop_assert_eq!(buf, plain);
    }

    #[test]
    fn cntr_is_an_involution(
        key in aes_key_strategy(),
        iv in proptest::collection::vec(any::<u8>(), 16),
        data in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let (enc, _) = expand_aes_key(&key).unwrap();
        let mut buf = data.clone();
        aes_modes::cntr(&enc, &iv, &mut buf);
        aes_modes::cntr(&enc, &iv, &mut buf);
        prop_assert_eq!(buf, data);
    }

    #[test]
    fn docsis_round_trips_any_length(
        key in proptest::collection::vec(any::<u8>(), 16),
        iv in proptest::collection::vec(any::<u8>(), 16),
        data in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let (enc, dec) = expand_aes_key(&key).unwrap();
        let mut buf = data.clone();
        aes_modes::docsis_encrypt(&enc, &iv, &mut buf);
        aes_modes::docsis_decrypt(&enc, &dec, &iv, &mut buf);
        prop_assert_eq!(buf, data);
    }

    #[test]
    fn des3_cbc_round_trips(
        key in proptest::collection::vec(any::<u8>(), 24),
        iv in proptest::collection::vec(any::<u8>(), 8),
        blocks in 1usize..8,
    ) {
        let k = expand_des_key(&key).unwrap();
        let plain = vec![0x5Au8; blocks * 8];
        let mut buf = plain.clone();
        des_modes::cbc_encrypt(&k, &iv, &mut buf);
        des_modes::cbc_decrypt(&k, &iv, &mut buf);
        prop_assert_eq!(buf, plain);
    }

    #[test]
    fn gcm_round_trips_with_matching_tags(
        key in aes_key_strategy(),
        iv in proptest::collection::vec(any::<u8>(), 12),
        aad in proptest::collection::vec(any::<u8>(), 0..48),
        data in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let k = precompute_gcm_key(&key).unwrap();
        let mut ct = vec![0u8; data.len()];
        let mut tag = [0u8; 16];
        gcm_encrypt(&k, &iv, &aad, &data, &mut ct, &mut tag).unwrap();

        let mut back = vec![0u8; ct.len()];
        let mut tag2 = [0u8; 16];
        gcm_decrypt(&k, &iv, &aad, &ct, &mut back, &mut tag2).unwrap();
        prop_assert_eq!(back, data);
        prop_assert_eq!(tag, tag2);
    }

    #[test]
    fn cmac_is_deterministic(
        key in proptest::collection::vec(any::<u8>(), 16),
        data in proptest::collection::vec(any::<u8>(), 0..100),
    ) {
        let k = AesKey::expand(&key).unwrap();
        let sub = derive_cmac_subkeys(&k).unwrap();
        let a = auth::cmac_tag(&sub, &data, 16);
        let b = auth::cmac_tag(&sub, &data, 16);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn hmac_truncation_is_a_prefix(
        key in proptest::collection::vec(any::<u8>(), 1..64),
        data in proptest::collection::vec(any::<u8>(), 0..100),
        tag_len in 1usize..32,
    ) {
        use mb_crypto_core::job::HashAlg;
        use mb_crypto_core::keys::HmacKey;
        let hk = HmacKey::precompute(HashAlg::HmacSha256, &key).unwrap();
        let full = auth::hmac_tag(&hk, &data, 32);
        let short = auth::hmac_tag(&hk, &data, tag_len);
        prop_assert_eq!(&full[..tag_len], &short[..]);
    }
}
