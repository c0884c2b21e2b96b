//! Aligned Memory Provisioning
//!
//! Owns the raw allocations behind the cache and the dataset: 64-byte
//! aligned heap memory, or a large-page mapping when requested. Allocation
//! failures surface immediately; nothing is retried and partial state is
//! released on drop.

use crate::kernels::constants::CACHE_LINE_SIZE;
use crate::types::MemoryError;
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// A 64-byte-aligned memory region of fixed size.
///
/// The contents are not zero-initialized; the dataset lifecycle fills every
/// byte before readers start.
pub(crate) struct AlignedMemory {
    ptr: NonNull<u8>,
    size: usize,
    backing: Backing,
}

enum Backing {
    Heap,
    LargePages,
}

impl AlignedMemory {
    /// Allocate `size` bytes for `region`, optionally backed by large pages.
    pub fn new(region: &'static str, size: usize, large_pages: bool) -> Result<Self, MemoryError> {
        if large_pages {
            Self::map_large_pages(region, size)
        } else {
            Self::heap(region, size)
        }
    }

    fn heap(region: &'static str, size: usize) -> Result<Self, MemoryError> {
        let layout = Layout::from_size_align(size, CACHE_LINE_SIZE)
            .map_err(|_| MemoryError::AllocationFailed { region, size })?;
        // SAFETY: layout has non-zero size; the pointer is checked for null
        // below and released with the identical layout in Drop.
        #[allow(unsafe_code)]
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw)
            .map(|ptr| Self {
                ptr,
                size,
                backing: Backing::Heap,
            })
            .ok_or(MemoryError::AllocationFailed { region, size })
    }

    #[cfg(target_os = "linux")]
    fn map_large_pages(region: &'static str, size: usize) -> Result<Self, MemoryError> {
        let os_error = || MemoryError::LargePagesFailed {
            region,
            os_error: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
        };
        // SAFETY: anonymous private mapping; no file descriptor is involved
        // and the result is validated against MAP_FAILED before use.
        #[allow(unsafe_code)]
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_HUGETLB,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(os_error());
        }
        NonNull::new(raw.cast::<u8>())
            .map(|ptr| Self {
                ptr,
                size,
                backing: Backing::LargePages,
            })
            .ok_or_else(os_error)
    }

    #[cfg(not(target_os = "linux"))]
    fn map_large_pages(_region: &'static str, _size: usize) -> Result<Self, MemoryError> {
        Err(MemoryError::LargePagesUnsupported)
    }

    /// Base pointer of the region.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Region length in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// View the region as bytes.
    #[allow(unsafe_code)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the region is owned, live for &self, and size bytes long.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }

    /// View the region as mutable bytes.
    #[allow(unsafe_code)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: the region is owned, uniquely borrowed for &mut self, and
        // size bytes long.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }

    #[allow(unsafe_code)]
    fn release_heap(&mut self) {
        // SAFETY: allocated in `heap` with this exact layout.
        unsafe {
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align_unchecked(self.size, CACHE_LINE_SIZE),
            );
        }
    }

    #[cfg(target_os = "linux")]
    #[allow(unsafe_code)]
    fn release_map(&mut self) {
        // SAFETY: mapped in `map_large_pages` with this length.
        unsafe {
            libc::munmap(self.ptr.as_ptr().cast(), self.size);
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn release_map(&mut self) {}
}

impl Drop for AlignedMemory {
    fn drop(&mut self) {
        match self.backing {
            Backing::Heap => self.release_heap(),
            Backing::LargePages => self.release_map(),
        }
    }
}

// SAFETY: AlignedMemory uniquely owns its region; shared access is read-only
// through &self and exclusive access requires &mut self.
#[allow(unsafe_code)]
unsafe impl Send for AlignedMemory {}
// SAFETY: see Send.
#[allow(unsafe_code)]
unsafe impl Sync for AlignedMemory {}
