//! Cache Handle
//!
//! The seed-derived cache: a 256 MiB read-only table plus the 8-slot round
//! key schedule. Built once per seed, then shared immutably by any number of
//! dataset initializers and light-mode readers.

use crate::engine::dispatcher::AesBackend;
use crate::kernels::constants::{CACHE_SIZE, SEED_SIZE};
use crate::memory::AlignedMemory;
use crate::types::{KeysContainer, MemoryError};

/// Seed-derived cache buffer and round-key schedule.
///
/// Immutable once [`Cache::initialize`] returns; share it with `Arc` across
/// threads without synchronization.
pub struct Cache {
    memory: AlignedMemory,
    keys: KeysContainer,
}

impl Cache {
    /// Allocate an uninitialized cache, optionally on large pages.
    ///
    /// # Errors
    /// Returns [`MemoryError`] when the OS refuses the allocation.
    pub fn allocate(large_pages: bool) -> Result<Self, MemoryError> {
        Ok(Self {
            memory: AlignedMemory::new("cache", CACHE_SIZE, large_pages)?,
            keys: KeysContainer::default(),
        })
    }

    /// Populate cache bytes and round keys deterministically from `seed`.
    ///
    /// The seed is padded into one input block and compressed; the digest
    /// seeds a keystream that expands into the cache, and a digest chain
    /// over it yields the round-key schedule. The same seed always produces
    /// the same cache, bit for bit, on every backend.
    pub fn initialize(&mut self, seed: &[u8; SEED_SIZE], backend: &AesBackend) {
        let mut block = [0u8; 64];
        block[..SEED_SIZE].copy_from_slice(seed);
        block[SEED_SIZE] = 0x80;

        let mut state = [0u8; 64];
        backend.hash_aes_1r_x4(&block, &mut state);

        let mut ka = [0u8; 64];
        backend.hash_aes_1r_x4(&state, &mut ka);
        let mut kb = [0u8; 64];
        backend.hash_aes_1r_x4(&ka, &mut kb);
        for (slot, src) in self
            .keys
            .0
            .iter_mut()
            .zip(ka.chunks_exact(16).chain(kb.chunks_exact(16)))
        {
            slot.copy_from_slice(src);
        }

        backend.fill_aes_1r_x4(&mut state, self.memory.as_mut_slice());
    }

    /// The cache bytes (64-byte aligned, `CACHE_SIZE` long).
    pub fn bytes(&self) -> &[u8] {
        self.memory.as_slice()
    }

    /// The round-key schedule.
    pub const fn keys(&self) -> &KeysContainer {
        &self.keys
    }
}
