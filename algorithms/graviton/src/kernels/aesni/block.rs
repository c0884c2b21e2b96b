//! AES-NI Block Initialization
//!
//! Hardware implementation of the dependent cache walk that derives one
//! 64-byte dataset block.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]

use crate::kernels::constants::{CACHE_LINE_SIZE, DATASET_ITERATIONS};
use crate::types::{DatasetLine, KeysContainer};

use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_cvtsi128_si32, _mm_cvtsi32_si128, _mm_load_si128,
    _mm_setzero_si128, _mm_store_si128, _mm_xor_si128,
};

/// Derive one 64-byte dataset block from the cache.
// SAFETY: Requires AES/SSE2 CPU features (enforced by dispatcher). Cache
// pointer is 64-byte aligned (allocator invariant, debug-checked) and every
// masked line offset stays inside the power-of-two cache slice, so the
// aligned loads are in bounds. The output line is 64-byte aligned by type.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn init_block(
    cache: &[u8],
    out: &mut DatasetLine,
    block_number: u32,
    keys: &KeysContainer,
) {
    debug_assert!(cache.len().is_power_of_two());
    debug_assert!(cache.len() >= CACHE_LINE_SIZE);
    debug_assert_eq!(cache.as_ptr() as usize % CACHE_LINE_SIZE, 0);
    let mask = (cache.len() / CACHE_LINE_SIZE - 1) as u32;

    let kp = keys.0.as_ptr().cast::<__m128i>();
    let k0 = _mm_load_si128(kp);
    let k2 = _mm_load_si128(kp.add(2));
    let k4 = _mm_load_si128(kp.add(4));
    let k6 = _mm_load_si128(kp.add(6));

    let base = cache.as_ptr();
    let mut x0 = _mm_cvtsi32_si128(block_number as i32);
    let mut x1 = _mm_setzero_si128();
    let mut x2 = _mm_setzero_si128();
    let mut x3 = _mm_setzero_si128();

    for _ in 0..DATASET_ITERATIONS {
        x0 = _mm_aesenc_si128(x0, k0);
        x1 = _mm_aesenc_si128(x0, k2);
        x2 = _mm_aesenc_si128(x1, k4);
        x3 = _mm_aesenc_si128(x2, k6);

        let line = (_mm_cvtsi128_si32(x3) as u32 & mask) as usize * CACHE_LINE_SIZE;
        let lp = base.add(line).cast::<__m128i>();
        x0 = _mm_xor_si128(x0, _mm_load_si128(lp));
        x1 = _mm_xor_si128(x1, _mm_load_si128(lp.add(1)));
        x2 = _mm_xor_si128(x2, _mm_load_si128(lp.add(2)));
        x3 = _mm_xor_si128(x3, _mm_load_si128(lp.add(3)));
    }

    let op = core::ptr::from_mut(out).cast::<__m128i>();
    _mm_store_si128(op, x0);
    _mm_store_si128(op.add(1), x1);
    _mm_store_si128(op.add(2), x2);
    _mm_store_si128(op.add(3), x3);
}
