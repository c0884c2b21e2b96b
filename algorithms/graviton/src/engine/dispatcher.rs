//! Hardware Dispatcher
//!
//! Selects between the AES-NI and portable kernels once per execution path.
//! Both backends are always compiled; a backend is a table of function
//! pointers, so the choice costs nothing per call and can differ between
//! call sites (e.g. hardware for dataset expansion, portable for a
//! cross-check).

use crate::kernels;
use crate::types::{DatasetLine, FillFn, HashFn, InitBlockFn, KeysContainer};

// =============================================================================
// BACKEND TABLE
// =============================================================================

/// A resolved set of mixing kernels (block init, finalization hash,
/// keystream generator). Construct with [`AesBackend::auto`],
/// [`AesBackend::hardware`], or [`AesBackend::software`].
#[derive(Clone, Copy, Debug)]
pub struct AesBackend {
    name: &'static str,
    init_block: InitBlockFn,
    hash: HashFn,
    fill: FillFn,
}

impl AesBackend {
    /// Returns the fastest backend supported by this CPU.
    #[must_use]
    pub fn auto() -> Self {
        Self::hardware().unwrap_or_else(Self::software)
    }

    /// Returns the AES-NI backend, or `None` when the CPU lacks AES/SSE2.
    #[must_use]
    pub fn hardware() -> Option<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
                return Some(Self {
                    name: "AES-NI",
                    init_block: hw_init_block,
                    hash: hw_hash_aes_1r_x4,
                    fill: hw_fill_aes_1r_x4,
                });
            }
        }
        None
    }

    /// Returns the portable software backend. Always available; the
    /// reference for cross-checking hardware results.
    #[must_use]
    pub fn software() -> Self {
        Self {
            name: "Portable",
            init_block: kernels::portable::init_block,
            hash: kernels::portable::hash_aes_1r_x4,
            fill: kernels::portable::fill_aes_1r_x4,
        }
    }

    /// Name of this backend.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Derive dataset block `block_number` from `cache` into `out`.
    ///
    /// `cache` must be 64-byte aligned with a power-of-two length.
    pub fn init_block(
        &self,
        cache: &[u8],
        out: &mut DatasetLine,
        block_number: u32,
        keys: &KeysContainer,
    ) {
        (self.init_block)(cache, out, block_number, keys);
    }

    /// Compress `input` into a 64-byte digest.
    ///
    /// # Panics
    /// Panics unless `input.len()` is a positive multiple of 64.
    pub fn hash_aes_1r_x4(&self, input: &[u8], output: &mut [u8; 64]) {
        assert!(
            !input.is_empty() && input.len() % 64 == 0,
            "finalization input must be a positive multiple of 64 bytes"
        );
        (self.hash)(input, output);
    }

    /// Expand `state` into `out.len()` keystream bytes, evolving `state`.
    ///
    /// # Panics
    /// Panics unless `out.len()` is a multiple of 64.
    pub fn fill_aes_1r_x4(&self, state: &mut [u8; 64], out: &mut [u8]) {
        assert!(
            out.len() % 64 == 0,
            "generator output length must be a multiple of 64 bytes"
        );
        (self.fill)(state, out);
    }
}

// =============================================================================
// WRAPPERS
// =============================================================================

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
fn hw_init_block(cache: &[u8], out: &mut DatasetLine, block_number: u32, keys: &KeysContainer) {
    // SAFETY: Only installed in the backend table after CPUID validation
    // (AES + SSE2).
    unsafe { kernels::aesni::init_block(cache, out, block_number, keys) }
}

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
fn hw_hash_aes_1r_x4(input: &[u8], output: &mut [u8; 64]) {
    // SAFETY: Only installed in the backend table after CPUID validation
    // (AES + SSE2).
    unsafe { kernels::aesni::hash_aes_1r_x4(input, output) }
}

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
fn hw_fill_aes_1r_x4(state: &mut [u8; 64], out: &mut [u8]) {
    // SAFETY: Only installed in the backend table after CPUID validation
    // (AES + SSE2).
    unsafe { kernels::aesni::fill_aes_1r_x4(state, out) }
}
