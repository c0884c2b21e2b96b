//! AES-NI Finalization Hash & Keystream Generator
//!
//! Hardware implementations of the 4-lane absorbing hash and the 4-lane
//! generator that expands seed material.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]

use crate::kernels::constants::{
    FILL_KEYS, HASH_STATE0, HASH_STATE1, HASH_STATE2, HASH_STATE3, HASH_XKEY0, HASH_XKEY1,
};

use core::arch::x86_64::{
    __m128i, _mm_aesdec_si128, _mm_aesenc_si128, _mm_loadu_si128, _mm_set_epi32, _mm_set_epi64x,
    _mm_storeu_si128,
};

/// Materialize a 128-bit constant given as four 32-bit words in memory
/// order (lowest word first).
// SAFETY: SSE2 guaranteed by callers. Compile-time constants only.
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
unsafe fn set_words(w: [u32; 4]) -> __m128i {
    _mm_set_epi32(w[3] as i32, w[2] as i32, w[1] as i32, w[0] as i32)
}

// =============================================================================
// FINALIZATION HASH
// =============================================================================

/// 4-lane 1-round AES absorbing hash: compresses `input` (length a positive
/// multiple of 64) into a 64-byte digest.
// SAFETY: Requires AES/SSE2 CPU features (enforced by dispatcher). Input
// chunks come from `chunks_exact`, loads are unaligned; output is written
// with unaligned stores.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn hash_aes_1r_x4(input: &[u8], output: &mut [u8; 64]) {
    debug_assert!(!input.is_empty());
    debug_assert_eq!(input.len() % 64, 0);

    let mut s0 = set_words(HASH_STATE0);
    let mut s1 = set_words(HASH_STATE1);
    let mut s2 = set_words(HASH_STATE2);
    let mut s3 = set_words(HASH_STATE3);

    // Absorb 64 bytes at a time in 4 lanes.
    for chunk in input.chunks_exact(64) {
        let p = chunk.as_ptr().cast::<__m128i>();
        s0 = _mm_aesenc_si128(s0, _mm_loadu_si128(p));
        s1 = _mm_aesdec_si128(s1, _mm_loadu_si128(p.add(1)));
        s2 = _mm_aesenc_si128(s2, _mm_loadu_si128(p.add(2)));
        s3 = _mm_aesdec_si128(s3, _mm_loadu_si128(p.add(3)));
    }

    // Two extra rounds for full diffusion of the last chunk.
    let xkey0 = set_words(HASH_XKEY0);
    let xkey1 = set_words(HASH_XKEY1);

    s0 = _mm_aesenc_si128(s0, xkey0);
    s1 = _mm_aesdec_si128(s1, xkey0);
    s2 = _mm_aesenc_si128(s2, xkey0);
    s3 = _mm_aesdec_si128(s3, xkey0);

    s0 = _mm_aesenc_si128(s0, xkey1);
    s1 = _mm_aesdec_si128(s1, xkey1);
    s2 = _mm_aesenc_si128(s2, xkey1);
    s3 = _mm_aesdec_si128(s3, xkey1);

    let op = output.as_mut_ptr().cast::<__m128i>();
    _mm_storeu_si128(op, s0);
    _mm_storeu_si128(op.add(1), s1);
    _mm_storeu_si128(op.add(2), s2);
    _mm_storeu_si128(op.add(3), s3);
}

// =============================================================================
// KEYSTREAM GENERATOR
// =============================================================================

/// 4-lane 1-round AES generator: expands the 64-byte `state` into
/// `out.len()` keystream bytes (length a multiple of 64), evolving the state
/// in place so consecutive calls continue the stream.
// SAFETY: Requires AES/SSE2 CPU features (enforced by dispatcher). All loads
// and stores are unaligned; chunk bounds come from `chunks_exact_mut`.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn fill_aes_1r_x4(state: &mut [u8; 64], out: &mut [u8]) {
    debug_assert_eq!(out.len() % 64, 0);

    let sp = state.as_ptr().cast::<__m128i>();
    let mut s0 = _mm_loadu_si128(sp);
    let mut s1 = _mm_loadu_si128(sp.add(1));
    let mut s2 = _mm_loadu_si128(sp.add(2));
    let mut s3 = _mm_loadu_si128(sp.add(3));

    let k0 = _mm_set_epi64x(FILL_KEYS[0].1 as i64, FILL_KEYS[0].0 as i64);
    let k1 = _mm_set_epi64x(FILL_KEYS[1].1 as i64, FILL_KEYS[1].0 as i64);
    let k2 = _mm_set_epi64x(FILL_KEYS[2].1 as i64, FILL_KEYS[2].0 as i64);
    let k3 = _mm_set_epi64x(FILL_KEYS[3].1 as i64, FILL_KEYS[3].0 as i64);

    for chunk in out.chunks_exact_mut(64) {
        s0 = _mm_aesdec_si128(s0, k0);
        s1 = _mm_aesenc_si128(s1, k1);
        s2 = _mm_aesdec_si128(s2, k2);
        s3 = _mm_aesenc_si128(s3, k3);

        let p = chunk.as_mut_ptr().cast::<__m128i>();
        _mm_storeu_si128(p, s0);
        _mm_storeu_si128(p.add(1), s1);
        _mm_storeu_si128(p.add(2), s2);
        _mm_storeu_si128(p.add(3), s3);
    }

    let so = state.as_mut_ptr().cast::<__m128i>();
    _mm_storeu_si128(so, s0);
    _mm_storeu_si128(so.add(1), s1);
    _mm_storeu_si128(so.add(2), s2);
    _mm_storeu_si128(so.add(3), s3);
}
