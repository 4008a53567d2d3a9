//! Parallel-driver equivalence: any legal (degree, parallel block size)
//! must produce the sequential ciphertext and tag, and the SIMD batch
//! widths behind the keystream are exercised through large transforms.

use widestream::{AcsStream, CryptoError, RwsStream};

/// Sequential reference ciphertext for the fixed key/nonce pair.
fn acs_reference(plaintext: &[u8]) -> Vec<u8> {
    let mut cipher = AcsStream::new(true);
    cipher.set_parallel_max_degree(1).unwrap();
    cipher.initialize(true, &[0x71; 64], &[0x72; 32], &[]).unwrap();
    cipher.set_associated_data(b"frame").unwrap();
    let mut sealed = vec![0u8; plaintext.len() + 64];
    cipher.transform(plaintext, &mut sealed, plaintext.len()).unwrap();
    sealed
}

#[test]
fn parallel_degrees_match_sequential() {
    let plaintext: Vec<u8> = (0..40_000).map(|i| (i * 7 % 256) as u8).collect();
    let reference = acs_reference(&plaintext);

    for degree in [2usize, 4, 8] {
        let mut cipher = AcsStream::new(true);
        if cipher.set_parallel_max_degree(degree).is_err() {
            continue; // not enough processors
        }
        // a small parallel block so several parallel rounds run
        let min = degree * 32;
        cipher.set_parallel_block_size(min * 8).unwrap();
        cipher.initialize(true, &[0x71; 64], &[0x72; 32], &[]).unwrap();
        cipher.set_associated_data(b"frame").unwrap();

        let mut sealed = vec![0u8; plaintext.len() + 64];
        cipher.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();
        assert_eq!(sealed, reference, "degree {degree} diverged");
    }
}

#[test]
fn parallel_remainder_is_processed_sequentially() {
    // length deliberately not a multiple of the parallel block
    let plaintext: Vec<u8> = (0..10_000 + 41).map(|i| (i % 253) as u8).collect();
    let reference = acs_reference(&plaintext);

    let mut cipher = AcsStream::new(true);
    if cipher.set_parallel_max_degree(2).is_err() {
        return;
    }
    cipher.set_parallel_block_size(2 * 32 * 16).unwrap();
    cipher.initialize(true, &[0x71; 64], &[0x72; 32], &[]).unwrap();
    cipher.set_associated_data(b"frame").unwrap();

    let mut sealed = vec![0u8; plaintext.len() + 64];
    cipher.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();
    assert_eq!(sealed, reference);
}

#[test]
fn rws_1024_multiblock_parallel_equivalence() {
    let plaintext = vec![0x06u8; 4096];

    let mut sequential = RwsStream::new(true);
    sequential.set_parallel_max_degree(1).unwrap();
    sequential.initialize(true, &[0x04; 128], &[0x05; 64], &[]).unwrap();
    let mut expected = vec![0u8; plaintext.len() + 128];
    sequential.transform(&plaintext, &mut expected, plaintext.len()).unwrap();

    let mut parallel = RwsStream::new(true);
    if parallel.set_parallel_max_degree(2).is_err() {
        return;
    }
    parallel.set_parallel_block_size(2 * 64 * 8).unwrap();
    parallel.initialize(true, &[0x04; 128], &[0x05; 64], &[]).unwrap();
    let mut sealed = vec![0u8; plaintext.len() + 128];
    parallel.transform(&plaintext, &mut sealed, plaintext.len()).unwrap();

    assert_eq!(sealed, expected);

    // decrypt the parallel output sequentially
    let mut decryptor = RwsStream::new(true);
    decryptor.set_parallel_max_degree(1).unwrap();
    decryptor.initialize(false, &[0x04; 128], &[0x05; 64], &[]).unwrap();
    let mut opened = vec![0u8; plaintext.len()];
    decryptor.transform(&sealed, &mut opened, plaintext.len()).unwrap();
    assert_eq!(opened, plaintext);
}

/// The session nonce must land on the same counter whichever driver ran.
#[test]
fn nonce_advances_identically_across_drivers() {
    let plaintext = vec![0u8; 8192];

    let mut sequential = AcsStream::new(false);
    sequential.set_parallel_max_degree(1).unwrap();
    sequential.initialize(true, &[0x42; 32], &[0x43; 32], &[]).unwrap();
    let mut scratch = vec![0u8; plaintext.len()];
    sequential.transform(&plaintext, &mut scratch, plaintext.len()).unwrap();

    let mut parallel = AcsStream::new(false);
    if parallel.set_parallel_max_degree(2).is_err() {
        return;
    }
    parallel.set_parallel_block_size(2 * 32 * 32).unwrap();
    parallel.initialize(true, &[0x42; 32], &[0x43; 32], &[]).unwrap();
    let mut scratch2 = vec![0u8; plaintext.len()];
    parallel.transform(&plaintext, &mut scratch2, plaintext.len()).unwrap();

    assert_eq!(sequential.nonce(), parallel.nonce());

    // and the next transform continues identically on both
    let tail = vec![0x99u8; 64];
    let mut out_seq = vec![0u8; 64];
    sequential.transform(&tail, &mut out_seq, 64).unwrap();
    let mut out_par = vec![0u8; 64];
    parallel.transform(&tail, &mut out_par, 64).unwrap();
    assert_eq!(out_seq, out_par);
}

#[test]
fn block_size_bounds_are_enforced_at_initialize() {
    let mut cipher = AcsStream::new(false);
    if cipher.set_parallel_max_degree(2).is_err() {
        return;
    }
    assert_eq!(
        cipher.set_parallel_block_size(usize::MAX - 63),
        Err(CryptoError::InvalidSize)
    );
    assert_eq!(
        cipher.set_parallel_block_size(2 * 32 + 1),
        Err(CryptoError::InvalidParam)
    );
}
