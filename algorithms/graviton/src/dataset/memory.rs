//! Dataset Memory
//!
//! The materialized 4 GiB dataset as a bounded view of 64-byte lines.
//! Line indices are the same block numbers consumed by initialization and by
//! the read engine, so out-of-range access is a bug, not an error path.

use crate::cache::Cache;
use crate::engine::dispatcher::AesBackend;
use crate::engine::parallel;
use crate::kernels::constants::{CACHE_LINE_SIZE, DATASET_BLOCK_COUNT, DATASET_SIZE};
use crate::memory::AlignedMemory;
use crate::types::{DatasetLine, MemoryError};

/// Owned, 64-byte-aligned dataset buffer of exactly `DATASET_SIZE` bytes.
///
/// Lifecycle: allocate (bytes arbitrary), initialize every line, then share
/// read-only. The orchestrator enforces the barrier between the last writer
/// and the first reader.
pub struct DatasetMemory {
    memory: AlignedMemory,
}

impl DatasetMemory {
    /// Allocate the dataset region, optionally on large pages. The contents
    /// are not zeroed.
    ///
    /// # Errors
    /// [`MemoryError::PlatformTooSmall`] when the address space cannot
    /// represent the dataset; otherwise the allocator's failure.
    pub fn allocate(large_pages: bool) -> Result<Self, MemoryError> {
        let size = usize::try_from(DATASET_SIZE).map_err(|_| MemoryError::PlatformTooSmall {
            required: DATASET_SIZE,
        })?;
        debug_assert_eq!(size / CACHE_LINE_SIZE, DATASET_BLOCK_COUNT as usize);
        Ok(Self {
            memory: AlignedMemory::new("dataset", size, large_pages)?,
        })
    }

    /// Generate every dataset block from `cache`, in parallel when the
    /// `multithread` feature is enabled.
    pub fn initialize(&mut self, cache: &Cache, backend: AesBackend) {
        parallel::init_lines(cache, backend, self.lines_mut(), 0);
    }

    /// The line holding dataset block `block`.
    pub fn line(&self, block: u32) -> &DatasetLine {
        &self.lines()[block as usize]
    }

    /// All dataset lines, indexed by block number.
    #[allow(unsafe_code)]
    pub fn lines(&self) -> &[DatasetLine] {
        // SAFETY: the allocation is 64-byte aligned, its length is a
        // multiple of the line size, and DatasetLine is a plain repr(C)
        // array of u64.
        unsafe {
            std::slice::from_raw_parts(
                self.memory.as_ptr().cast::<DatasetLine>(),
                self.memory.len() / CACHE_LINE_SIZE,
            )
        }
    }

    /// All dataset lines, mutably. Split this slice to hand disjoint ranges
    /// to initializer workers.
    #[allow(unsafe_code)]
    pub fn lines_mut(&mut self) -> &mut [DatasetLine] {
        let len = self.memory.len() / CACHE_LINE_SIZE;
        // SAFETY: see `lines`; the mutable borrow of self is exclusive.
        unsafe {
            std::slice::from_raw_parts_mut(
                self.memory.as_mut_slice().as_mut_ptr().cast::<DatasetLine>(),
                len,
            )
        }
    }
}
