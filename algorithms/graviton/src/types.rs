//! Shared types used across the Graviton library.

use crate::kernels::constants::{KEYS_COUNT, REGISTERS_COUNT};
use core::fmt;
use std::error;

// =============================================================================
// KERNEL INTERFACE
// =============================================================================

/// Unified block-initializer signature: `(cache, out, block_number, keys)`.
///
/// The hardware and portable backends implement this same signature so the
/// dispatcher can swap them once per execution path with no per-call cost.
pub type InitBlockFn = fn(&[u8], &mut DatasetLine, u32, &KeysContainer);

/// Unified finalization-hash signature: `(input, digest)`.
pub type HashFn = fn(&[u8], &mut [u8; 64]);

/// Unified keystream-generator signature: `(state, out)`.
pub type FillFn = fn(&mut [u8; 64], &mut [u8]);

// =============================================================================
// DATA LAYOUT
// =============================================================================

/// One 64-byte dataset line, the unit of dataset content and of every
/// dataset read. Alignment matches the SIMD store width of the kernels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct DatasetLine(pub [u64; REGISTERS_COUNT]);

/// The 8-slot round-key schedule derived alongside the cache.
///
/// Block initialization consumes the even slots; odd slots are reserved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct KeysContainer(pub [[u8; 16]; KEYS_COUNT]);

// =============================================================================
// VM STATE
// =============================================================================

/// The VM's integer register file; one dataset read XORs a full line into it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    /// 64-bit integer registers, addressed as unsigned values.
    pub r: [u64; REGISTERS_COUNT],
}

/// The VM's dataset read-pointer pair.
///
/// `ma` is always 64-byte aligned and addresses the next line to be read;
/// `mx` is mutated freely and aligned only at the moment the pointers swap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryRegisters {
    /// Aligned address of the next dataset read.
    pub ma: u32,
    /// Scratch address mixed with VM-supplied addresses between reads.
    pub mx: u32,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Failure to provision cache or dataset memory. Fatal; the core never
/// retries an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The platform's address space cannot represent the dataset.
    PlatformTooSmall {
        /// Bytes the dataset requires.
        required: u64,
    },
    /// The OS refused an ordinary aligned allocation.
    AllocationFailed {
        /// Region that failed ("cache" or "dataset").
        region: &'static str,
        /// Bytes requested.
        size: usize,
    },
    /// The OS refused a large-page mapping.
    LargePagesFailed {
        /// Region that failed ("cache" or "dataset").
        region: &'static str,
        /// Raw OS error code from the mapping call.
        os_error: i32,
    },
    /// Large pages are not supported on this platform.
    LargePagesUnsupported,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlatformTooSmall { required } => write!(
                f,
                "platform address space too small: the dataset needs {required} bytes"
            ),
            Self::AllocationFailed { region, size } => {
                write!(f, "{region} memory allocation failed ({size} bytes)")?;
                if *region == "dataset" {
                    write!(f, "; >4 GiB of free virtual memory is needed")?;
                }
                Ok(())
            }
            Self::LargePagesFailed { region, os_error } => write!(
                f,
                "large-page allocation for the {region} failed (OS error {os_error})"
            ),
            Self::LargePagesUnsupported => {
                write!(f, "large pages are not supported on this platform")
            }
        }
    }
}

impl error::Error for MemoryError {}
