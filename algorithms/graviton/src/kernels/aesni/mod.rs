//! AES-NI kernels.
//!
//! Hardware implementations of block initialization, the finalization hash,
//! and the keystream generator. Byte-identical to the portable kernels.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod block;
mod finalize;

pub use block::init_block;
pub use finalize::{fill_aes_1r_x4, hash_aes_1r_x4};

use crate::kernels::portable::utils::U128;
use core::arch::x86_64::{_mm_aesdec_si128, _mm_aesenc_si128, _mm_load_si128, _mm_store_si128};

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Hardware single-round AES encryption.
// SAFETY: Requires AES/SSE2 CPU features (enforced by dispatcher). U128 is
// 16-byte aligned, so the aligned load/store pair is valid.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn aesenc(state: U128, key: U128) -> U128 {
    let s = _mm_load_si128(state.b.as_ptr().cast());
    let k = _mm_load_si128(key.b.as_ptr().cast());
    let mut out = U128::zero();
    _mm_store_si128(out.b.as_mut_ptr().cast(), _mm_aesenc_si128(s, k));
    out
}

/// Hardware single-round AES decryption.
// SAFETY: Requires AES/SSE2 CPU features (enforced by dispatcher). U128 is
// 16-byte aligned, so the aligned load/store pair is valid.
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
#[allow(unsafe_code)]
pub unsafe fn aesdec(state: U128, key: U128) -> U128 {
    let s = _mm_load_si128(state.b.as_ptr().cast());
    let k = _mm_load_si128(key.b.as_ptr().cast());
    let mut out = U128::zero();
    _mm_store_si128(out.b.as_mut_ptr().cast(), _mm_aesdec_si128(s, k));
    out
}
