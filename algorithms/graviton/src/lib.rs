//! # Graviton
//!
//! Memory-hard proof-of-work core: AES-driven expansion of a seed-derived
//! cache into a multi-gigabyte dataset, three dataset read modes feeding the
//! VM register file, and a 4-lane 1-round AES finalization hash.
//! Accelerated by AES-NI, with a bit-identical portable fallback.

//! # Usage
//! ```rust
//! // Finalize a 64-byte-aligned VM scratchpad into a 64-byte digest
//! let scratchpad = [0u8; 256];
//! let digest = graviton::hash_aes_1r_x4(&scratchpad);
//! assert_eq!(digest.len(), 64);
//!
//! // Pick the AES kernels once per execution path
//! let backend = graviton::AesBackend::auto();
//! println!("hashing with {}", backend.name());
//! ```

// =============================================================================
// MODULES
// =============================================================================

mod cache;
mod dataset;
mod engine;
// Re-export internal kernels for benchmarking/testing if needed, but hide from docs
#[doc(hidden)]
pub mod kernels; // Public for test/example use only
mod memory;
pub(crate) mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use cache::Cache;
pub use dataset::async_worker::{AsyncBlockWorker, LightClientAsyncWorker};
pub use dataset::memory::DatasetMemory;
pub use dataset::read::{dataset_read, dataset_read_light, dataset_read_light_async};
pub use dataset::{dataset_init, dataset_init_cache, Dataset};
pub use engine::dispatcher::AesBackend;
pub use engine::parallel::init_lines;
pub use kernels::aes_bench;
pub use types::{DatasetLine, KeysContainer, MemoryError, MemoryRegisters, RegisterFile};

/// Compute the 64-byte finalization digest of `input` with the fastest
/// available backend.
///
/// # Panics
/// Panics unless `input.len()` is a positive multiple of 64.
#[must_use]
pub fn hash_aes_1r_x4(input: &[u8]) -> [u8; 64] {
    let mut digest = [0u8; 64];
    AesBackend::auto().hash_aes_1r_x4(input, &mut digest);
    digest
}

/// Returns the name of the hardware backend currently in use.
#[must_use]
pub fn active_backend() -> &'static str {
    AesBackend::auto().name()
}
