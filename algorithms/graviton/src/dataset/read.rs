//! Dataset Read Engine
//!
//! One read XORs a 64-byte line into the register file and advances the
//! read-pointer pair. The three modes differ only in where the line comes
//! from; their effect on `(ma, mx, r)` is identical and protocol-visible:
//! the XOR uses the old `ma`, then `mx` absorbs the VM address, is aligned,
//! and swaps with `ma`.

#![allow(clippy::cast_possible_truncation)]

use super::memory::DatasetMemory;
use super::Dataset;
use crate::kernels::constants::CACHE_LINE_SIZE;
use crate::types::{DatasetLine, MemoryRegisters, RegisterFile};

const LINE_ALIGN_MASK: u32 = !(CACHE_LINE_SIZE as u32 - 1);

// =============================================================================
// READ MODES
// =============================================================================

/// Full-mode read: load the line at `memory.ma` straight from the
/// materialized dataset.
///
/// # Panics
/// Panics when `ds` is not a [`Dataset::Full`] handle.
pub fn dataset_read(ds: &Dataset, addr: u32, memory: &mut MemoryRegisters, reg: &mut RegisterFile) {
    let Dataset::Full(data) = ds else {
        unreachable!("full-mode read on a non-materialized dataset handle")
    };
    xor_line(reg, data.line(memory.ma / CACHE_LINE_SIZE as u32));
    advance(memory, addr);
    prefetch_line(data, memory.ma);
}

/// Light-mode read: recompute the line at `memory.ma` from the cache into a
/// local buffer.
///
/// # Panics
/// Panics when `ds` is not a [`Dataset::Light`] handle.
pub fn dataset_read_light(
    ds: &Dataset,
    addr: u32,
    memory: &mut MemoryRegisters,
    reg: &mut RegisterFile,
) {
    let Dataset::Light { cache, backend } = ds else {
        unreachable!("light-mode read on a non-cache-backed dataset handle")
    };
    let mut line = DatasetLine::default();
    backend.init_block(
        cache.bytes(),
        &mut line,
        memory.ma / CACHE_LINE_SIZE as u32,
        cache.keys(),
    );
    xor_line(reg, &line);
    advance(memory, addr);
}

/// Async-light read: take the line at `memory.ma` from the prefetch worker
/// (blocking until it is ready), then request the next line.
///
/// # Panics
/// Panics when `ds` is not a [`Dataset::LightAsync`] handle.
pub fn dataset_read_light_async(
    ds: &Dataset,
    addr: u32,
    memory: &mut MemoryRegisters,
    reg: &mut RegisterFile,
) {
    let Dataset::LightAsync(worker) = ds else {
        unreachable!("async-mode read on a dataset handle without a worker")
    };
    let line = worker.get_block(memory.ma);
    xor_line(reg, &line);
    advance(memory, addr);
    worker.prepare_block(memory.ma);
}

// =============================================================================
// SHARED STATE TRANSITION
// =============================================================================

fn xor_line(reg: &mut RegisterFile, line: &DatasetLine) {
    for (r, word) in reg.r.iter_mut().zip(line.0.iter()) {
        *r ^= word;
    }
}

fn advance(memory: &mut MemoryRegisters, addr: u32) {
    memory.mx ^= addr;
    memory.mx &= LINE_ALIGN_MASK; // align to cache line
    core::mem::swap(&mut memory.ma, &mut memory.mx);
}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))] {
        #[allow(unsafe_code)]
        fn prefetch_line(data: &DatasetMemory, ma: u32) {
            use core::arch::x86_64::{_mm_prefetch, _MM_HINT_NTA};
            let ptr = core::ptr::from_ref(data.line(ma / CACHE_LINE_SIZE as u32)).cast::<i8>();
            // SAFETY: prefetch is a hint with no memory effects; the pointer
            // is a valid in-bounds line address.
            unsafe {
                _mm_prefetch::<_MM_HINT_NTA>(ptr);
            }
        }
    } else {
        fn prefetch_line(_data: &DatasetMemory, _ma: u32) {}
    }
}
