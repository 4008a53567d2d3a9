//! Randomized property tests: the AEAD invariants must hold across
//! arbitrary message lengths, keys, and associated data.

use proptest::prelude::*;
use widestream::{AcsStream, CryptoError, RwsStream};

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 32),
        proptest::collection::vec(any::<u8>(), 64),
        proptest::collection::vec(any::<u8>(), 128),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// decrypt(encrypt(p)) == p for every key size and message length.
    #[test]
    fn acs_roundtrip(
        key in key_strategy(),
        nonce in proptest::collection::vec(any::<u8>(), 32),
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        ad in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let mut enc = AcsStream::new(true);
        enc.initialize(true, &key, &nonce, &[]).unwrap();
        enc.set_associated_data(&ad).unwrap();
        let tag_size = enc.tag_size().unwrap();
        let mut sealed = vec![0u8; plaintext.len() + tag_size];
        enc.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();

        let mut dec = AcsStream::new(true);
        dec.initialize(false, &key, &nonce, &[]).unwrap();
        dec.set_associated_data(&ad).unwrap();
        let mut opened = vec![0u8; plaintext.len()];
        dec.transform(&sealed, &mut opened, plaintext.len()).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    #[test]
    fn rws_roundtrip(
        key in key_strategy(),
        nonce in proptest::collection::vec(any::<u8>(), 64),
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let mut enc = RwsStream::new(true);
        enc.initialize(true, &key, &nonce, &[]).unwrap();
        let tag_size = enc.tag_size().unwrap();
        let mut sealed = vec![0u8; plaintext.len() + tag_size];
        enc.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();

        let mut dec = RwsStream::new(true);
        dec.initialize(false, &key, &nonce, &[]).unwrap();
        let mut opened = vec![0u8; plaintext.len()];
        dec.transform(&sealed, &mut opened, plaintext.len()).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    /// Any single-bit flip anywhere in ciphertext or tag must be caught.
    #[test]
    fn acs_any_bit_flip_fails(
        plaintext in proptest::collection::vec(any::<u8>(), 1..512),
        flip_bit in any::<u16>(),
    ) {
        let key = [0x37u8; 64];
        let nonce = [0x38u8; 32];

        let mut enc = AcsStream::new(true);
        enc.initialize(true, &key, &nonce, &[]).unwrap();
        let mut sealed = vec![0u8; plaintext.len() + 64];
        enc.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();

        let bit = flip_bit as usize % (sealed.len() * 8);
        sealed[bit / 8] ^= 1 << (bit % 8);

        let mut dec = AcsStream::new(true);
        dec.initialize(false, &key, &nonce, &[]).unwrap();
        let mut opened = vec![0u8; plaintext.len()];
        prop_assert_eq!(
            dec.transform(&sealed, &mut opened, plaintext.len()),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    /// Changing any byte of the associated data changes the tag.
    #[test]
    fn ad_binds_the_tag(
        ad in proptest::collection::vec(any::<u8>(), 1..256),
        mutate_at in any::<u16>(),
        xor_with in 1u8..,
    ) {
        let key = [0x39u8; 32];
        let nonce = [0x3Au8; 32];
        let plaintext = [0x3Bu8; 48];

        let mut a = AcsStream::new(true);
        a.initialize(true, &key, &nonce, &[]).unwrap();
        a.set_associated_data(&ad).unwrap();
        let mut sealed = vec![0u8; plaintext.len() + 32];
        a.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();
        let tag_a = a.tag().unwrap();

        let mut mutated = ad.clone();
        let at = mutate_at as usize % mutated.len();
        mutated[at] ^= xor_with;

        let mut b = AcsStream::new(true);
        b.initialize(true, &key, &nonce, &[]).unwrap();
        b.set_associated_data(&mutated).unwrap();
        let mut sealed_b = vec![0u8; plaintext.len() + 32];
        b.transform(&plaintext, &mut sealed_b, plaintext.len()).unwrap();
        let tag_b = b.tag().unwrap();

        prop_assert_ne!(tag_a, tag_b);
    }

    /// Serialize/restore at an arbitrary point does not change the stream.
    #[test]
    fn restore_is_transparent(
        first_len in 0usize..600,
        second_len in 1usize..600,
    ) {
        let key = [0x3Cu8; 64];
        let nonce = [0x3Du8; 64];

        let mut direct = RwsStream::new(false);
        direct.initialize(true, &key, &nonce, &[]).unwrap();
        let total = first_len + second_len;
        let mut expected = vec![0u8; total];
        direct.transform(&vec![0u8; total], &mut expected, total).unwrap();

        let mut staged = RwsStream::new(false);
        staged.initialize(true, &key, &nonce, &[]).unwrap();
        let mut head = vec![0u8; first_len];
        staged.transform(&vec![0u8; first_len], &mut head, first_len).unwrap();

        let snapshot = staged.serialize();
        let mut resumed = RwsStream::new_from_state(&snapshot).unwrap();
        let mut tail = vec![0u8; second_len];
        resumed.transform(&vec![0u8; second_len], &mut tail, second_len).unwrap();

        prop_assert_eq!(&head[..], &expected[..first_len]);
        // a split mid-block consumes that whole counter block, so the
        // resumed stream picks up at the next block boundary
        let aligned = first_len.div_ceil(64) * 64;
        let offset = aligned - first_len;
        if offset < second_len {
            let n = second_len - offset;
            prop_assert_eq!(&tail[..n], &expected[aligned..aligned + n]);
        }
    }
}
