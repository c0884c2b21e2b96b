//! Kernel Dispatcher
//!
//! Contains hardware-specific and portable implementations of the Graviton
//! mixing primitives.

#[cfg(target_arch = "x86_64")]
pub mod aesni;
pub mod constants;
pub mod portable;

use crate::engine::dispatcher::AesBackend;
use crate::types::{DatasetLine, KeysContainer};

/// Blocks processed per `aes_bench` scratch region (4 KiB of feed data).
const BENCH_SCRATCH_LINES: usize = 64;

/// Throughput micro-benchmark shim: runs block initialization `block_count`
/// times over a small aligned scratch region, discarding the results.
/// Diagnostic only; the output carries no correctness contract.
pub fn aes_bench(block_count: u32, backend: &AesBackend) {
    let scratch = vec![DatasetLine::default(); BENCH_SCRATCH_LINES];
    // SAFETY: DatasetLine is a plain repr(C) array of u64, so viewing the
    // fully initialized Vec as bytes is valid for its entire length.
    #[allow(unsafe_code)]
    let feed = unsafe {
        core::slice::from_raw_parts(
            scratch.as_ptr().cast::<u8>(),
            scratch.len() * constants::CACHE_LINE_SIZE,
        )
    };

    let keys = KeysContainer::default();
    let mut out = DatasetLine::default();
    for _ in 0..block_count {
        backend.init_block(feed, &mut out, 0, &keys);
    }
    std::hint::black_box(&out);
}
