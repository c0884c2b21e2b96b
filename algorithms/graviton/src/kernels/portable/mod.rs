//! Portable kernels.
//!
//! Fully self-contained software implementations of block initialization,
//! the finalization hash, and the keystream generator, producing
//! byte-identical results to the AES-NI kernels.

#![allow(clippy::cast_possible_truncation)]

use self::utils::{aesdec, aesenc, U128};
use crate::kernels::constants::{
    CACHE_LINE_SIZE, DATASET_ITERATIONS, FILL_KEYS, HASH_STATE0, HASH_STATE1, HASH_STATE2,
    HASH_STATE3, HASH_XKEY0, HASH_XKEY1,
};
use crate::types::{DatasetLine, KeysContainer};

pub mod utils;

// =============================================================================
// BLOCK INITIALIZATION
// =============================================================================

/// Derive one 64-byte dataset block from the cache.
///
/// The block number is expanded through a chain of AES rounds whose final
/// value selects a cache line; the fetched line is folded back into the
/// state. Repeating this walk makes every output block depend on a
/// pseudo-random sequence of cache reads.
pub fn init_block(cache: &[u8], out: &mut DatasetLine, block_number: u32, keys: &KeysContainer) {
    debug_assert!(cache.len().is_power_of_two());
    debug_assert!(cache.len() >= CACHE_LINE_SIZE);
    let mask = (cache.len() / CACHE_LINE_SIZE - 1) as u32;

    let k0 = U128::from_slice(&keys.0[0]);
    let k2 = U128::from_slice(&keys.0[2]);
    let k4 = U128::from_slice(&keys.0[4]);
    let k6 = U128::from_slice(&keys.0[6]);

    let mut x0 = U128::from_low_u32(block_number);
    let mut x1 = U128::zero();
    let mut x2 = U128::zero();
    let mut x3 = U128::zero();

    for _ in 0..DATASET_ITERATIONS {
        x0 = aesenc(x0, k0);
        x1 = aesenc(x0, k2);
        x2 = aesenc(x1, k4);
        x3 = aesenc(x2, k6);

        let line = (x3.low_u32() & mask) as usize * CACHE_LINE_SIZE;
        x0 = x0.xor(&U128::from_slice(&cache[line..line + 16]));
        x1 = x1.xor(&U128::from_slice(&cache[line + 16..line + 32]));
        x2 = x2.xor(&U128::from_slice(&cache[line + 32..line + 48]));
        x3 = x3.xor(&U128::from_slice(&cache[line + 48..line + 64]));
    }

    store_line(out, &x0, &x1, &x2, &x3);
}

fn store_line(out: &mut DatasetLine, x0: &U128, x1: &U128, x2: &U128, x3: &U128) {
    for (pair, x) in out.0.chunks_exact_mut(2).zip([x0, x1, x2, x3]) {
        pair[0] = u64::from_le_bytes([
            x.b[0], x.b[1], x.b[2], x.b[3], x.b[4], x.b[5], x.b[6], x.b[7],
        ]);
        pair[1] = u64::from_le_bytes([
            x.b[8], x.b[9], x.b[10], x.b[11], x.b[12], x.b[13], x.b[14], x.b[15],
        ]);
    }
}

// =============================================================================
// FINALIZATION HASH
// =============================================================================

/// 4-lane 1-round AES absorbing hash: compresses `input` (length a positive
/// multiple of 64) into a 64-byte digest.
pub fn hash_aes_1r_x4(input: &[u8], output: &mut [u8; 64]) {
    debug_assert!(!input.is_empty());
    debug_assert_eq!(input.len() % 64, 0);

    let mut s0 = U128::from_u32s(HASH_STATE0);
    let mut s1 = U128::from_u32s(HASH_STATE1);
    let mut s2 = U128::from_u32s(HASH_STATE2);
    let mut s3 = U128::from_u32s(HASH_STATE3);

    // Absorb 64 bytes at a time in 4 lanes. Alternating enc/dec keeps the
    // lanes algebraically independent while every lane stays one AES round
    // deep per chunk.
    for chunk in input.chunks_exact(64) {
        s0 = aesenc(s0, U128::from_slice(&chunk[0..16]));
        s1 = aesdec(s1, U128::from_slice(&chunk[16..32]));
        s2 = aesenc(s2, U128::from_slice(&chunk[32..48]));
        s3 = aesdec(s3, U128::from_slice(&chunk[48..64]));
    }

    // Two extra rounds for full diffusion of the last chunk.
    let xkey0 = U128::from_u32s(HASH_XKEY0);
    let xkey1 = U128::from_u32s(HASH_XKEY1);

    s0 = aesenc(s0, xkey0);
    s1 = aesdec(s1, xkey0);
    s2 = aesenc(s2, xkey0);
    s3 = aesdec(s3, xkey0);

    s0 = aesenc(s0, xkey1);
    s1 = aesdec(s1, xkey1);
    s2 = aesenc(s2, xkey1);
    s3 = aesdec(s3, xkey1);

    output[0..16].copy_from_slice(&s0.b);
    output[16..32].copy_from_slice(&s1.b);
    output[32..48].copy_from_slice(&s2.b);
    output[48..64].copy_from_slice(&s3.b);
}

// =============================================================================
// KEYSTREAM GENERATOR
// =============================================================================

/// 4-lane 1-round AES generator: expands the 64-byte `state` into
/// `out.len()` keystream bytes (length a multiple of 64), evolving the state
/// in place so consecutive calls continue the stream.
pub fn fill_aes_1r_x4(state: &mut [u8; 64], out: &mut [u8]) {
    debug_assert_eq!(out.len() % 64, 0);

    let mut s0 = U128::from_slice(&state[0..16]);
    let mut s1 = U128::from_slice(&state[16..32]);
    let mut s2 = U128::from_slice(&state[32..48]);
    let mut s3 = U128::from_slice(&state[48..64]);

    let k0 = U128::from_u64s(FILL_KEYS[0].0, FILL_KEYS[0].1);
    let k1 = U128::from_u64s(FILL_KEYS[1].0, FILL_KEYS[1].1);
    let k2 = U128::from_u64s(FILL_KEYS[2].0, FILL_KEYS[2].1);
    let k3 = U128::from_u64s(FILL_KEYS[3].0, FILL_KEYS[3].1);

    for chunk in out.chunks_exact_mut(64) {
        s0 = aesdec(s0, k0);
        s1 = aesenc(s1, k1);
        s2 = aesdec(s2, k2);
        s3 = aesenc(s3, k3);

        chunk[0..16].copy_from_slice(&s0.b);
        chunk[16..32].copy_from_slice(&s1.b);
        chunk[32..48].copy_from_slice(&s2.b);
        chunk[48..64].copy_from_slice(&s3.b);
    }

    state[0..16].copy_from_slice(&s0.b);
    state[16..32].copy_from_slice(&s1.b);
    state[32..48].copy_from_slice(&s2.b);
    state[48..64].copy_from_slice(&s3.b);
}
