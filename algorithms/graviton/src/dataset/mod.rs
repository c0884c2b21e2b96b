//! Dataset Construction & Access
//!
//! The dataset handle in its three shapes (materialized, cache-backed,
//! prefetched), block generation over it, and the read engine that feeds the
//! VM register file.

pub mod async_worker;
pub mod memory;
pub mod read;

use crate::cache::Cache;
use crate::engine::dispatcher::AesBackend;
use crate::kernels::constants::SEED_SIZE;
use crate::types::MemoryError;
use async_worker::LightClientAsyncWorker;
use memory::DatasetMemory;
use std::sync::Arc;

// =============================================================================
// DATASET HANDLE
// =============================================================================

/// A dataset handle: how `dataset read` instructions resolve their lines.
///
/// The read function applied to a handle must match its shape; a mismatch is
/// a programmer error, checked in debug builds.
pub enum Dataset {
    /// Fully materialized dataset; reads are plain memory loads.
    Full(DatasetMemory),
    /// Cache-backed handle; reads recompute their block on the fly.
    Light {
        /// The shared seed-derived cache.
        cache: Arc<Cache>,
        /// Kernels used for on-the-fly block recomputation.
        backend: AesBackend,
    },
    /// Worker-backed handle; reads consume prefetched blocks.
    LightAsync(Arc<dyn LightClientAsyncWorker>),
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// Build a cache-backed (light) dataset handle from `seed`.
///
/// # Errors
/// Returns [`MemoryError`] when the cache allocation fails.
pub fn dataset_init_cache(
    seed: &[u8; SEED_SIZE],
    large_pages: bool,
    backend: AesBackend,
) -> Result<Dataset, MemoryError> {
    let mut cache = Cache::allocate(large_pages)?;
    cache.initialize(seed, &backend);
    Ok(Dataset::Light {
        cache: Arc::new(cache),
        backend,
    })
}

/// Generate dataset blocks `[start_block, start_block + block_count)` into
/// `ds`.
///
/// This is the per-worker unit: callers driving several workers hand each
/// one a disjoint range (or split [`DatasetMemory::lines_mut`] directly);
/// disjoint ranges touch disjoint lines, so no synchronization is needed.
pub fn dataset_init(
    cache: &Cache,
    backend: AesBackend,
    ds: &mut DatasetMemory,
    start_block: u32,
    block_count: u32,
) {
    let start = start_block as usize;
    let lines = &mut ds.lines_mut()[start..start + block_count as usize];
    for (i, line) in lines.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let block = start_block + i as u32;
        backend.init_block(cache.bytes(), line, block, cache.keys());
    }
}
