//! Parallel Dataset Construction
//!
//! Fans block initialization across the rayon pool when the `multithread`
//! feature is enabled, falling back to a serial sweep otherwise. Work units
//! are disjoint slices of output lines, so no synchronization is needed
//! beyond the implicit join.

#![allow(clippy::cast_possible_truncation)]

use crate::cache::Cache;
use crate::engine::dispatcher::AesBackend;
use crate::types::DatasetLine;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Lines per parallel work unit (4 MiB of output per task).
pub const INIT_CHUNK_LINES: usize = 1 << 16;

// =============================================================================
// DRIVER
// =============================================================================

/// Initialize `lines` with consecutive dataset blocks starting at
/// `start_block`.
///
/// Callers that manage their own threads can instead split the line slice
/// with `split_at_mut` and run [`crate::dataset_init`] per range; results
/// are byte-identical either way.
pub fn init_lines(cache: &Cache, backend: AesBackend, lines: &mut [DatasetLine], start_block: u32) {
    debug_assert!(lines.len() <= u32::MAX as usize);
    lines.process_chunks(INIT_CHUNK_LINES, |chunk_index, chunk| {
        let first = start_block + (chunk_index * INIT_CHUNK_LINES) as u32;
        for (i, line) in chunk.iter_mut().enumerate() {
            backend.init_block(cache.bytes(), line, first + i as u32, cache.keys());
        }
    });
}

/// Helper for feature-agnostic chunk processing
trait ChunkProcessor {
    fn process_chunks<F>(self, chunk_size: usize, f: F)
    where
        F: Fn(usize, &mut [DatasetLine]) + Sync + Send;
}

impl ChunkProcessor for &mut [DatasetLine] {
    fn process_chunks<F>(self, chunk_size: usize, f: F)
    where
        F: Fn(usize, &mut [DatasetLine]) + Sync + Send,
    {
        #[cfg(feature = "multithread")]
        {
            use rayon::prelude::*;
            self.par_chunks_mut(chunk_size)
                .enumerate()
                .for_each(|(i, chunk)| f(i, chunk));
        }
        #[cfg(not(feature = "multithread"))]
        {
            self.chunks_mut(chunk_size)
                .enumerate()
                .for_each(|(i, chunk)| f(i, chunk));
        }
    }
}
