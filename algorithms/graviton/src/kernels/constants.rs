//! Graviton Kernel Constants
//!
//! Two families of constants live here:
//!
//! 1. **Protocol constants** — sizes, iteration counts, and the finalization
//!    lane/key material. These are consensus-visible: verifier and prover
//!    must agree on every word, so none of them is configurable.
//! 2. **Generator keys** — derived from a single rule:
//!
//!    ```text
//!    constant = floor(frac(ln(p)) * 2^64)
//!    ```
//!
//!    where p is a prime number and frac(x) = x - floor(x). This ensures
//!    "nothing up my sleeve" — every constant is independently reproducible
//!    from the natural logarithm of a prime.

use static_assertions::{const_assert, const_assert_eq};

// =============================================================================
// MEMORY GEOMETRY
// =============================================================================

/// Bytes per dataset/cache line. One read consumes exactly one line.
pub const CACHE_LINE_SIZE: usize = 64;

/// Seed-derived cache size in bytes (256 MiB).
pub const CACHE_SIZE: usize = 1 << 28;

/// Expanded dataset size in bytes (4 GiB).
///
/// Kept as `u64`: the whole point of the `PlatformTooSmall` error is that
/// this value does not fit a 32-bit `usize`.
pub const DATASET_SIZE: u64 = 1 << 32;

/// Number of 64-byte blocks in the dataset.
#[allow(clippy::cast_possible_truncation)]
pub const DATASET_BLOCK_COUNT: u32 = (DATASET_SIZE / CACHE_LINE_SIZE as u64) as u32;

// =============================================================================
// ALGORITHM PARAMETERS
// =============================================================================

/// Mixing rounds per dataset block.
pub const DATASET_ITERATIONS: usize = 16;

/// 64-bit integer registers XORed per dataset read (8 × 8 = one line).
pub const REGISTERS_COUNT: usize = 8;

/// Input seed length in bytes.
pub const SEED_SIZE: usize = 32;

/// Round-key schedule slots. Block initialization consumes the even slots
/// (0, 2, 4, 6); the odd slots are reserved.
pub const KEYS_COUNT: usize = 8;

/// AES GF(2^8) reduction polynomial: x^8 + x^4 + x^3 + x + 1
pub const GF_POLY: u8 = 0x1b;

/// Finalization digest size in bytes.
pub const HASH_SIZE: usize = 64;

// =============================================================================
// FINALIZATION HASH — LANE STATES AND EXTRA ROUND KEYS
// =============================================================================
//
// 128-bit values listed as four 32-bit words in memory order (lowest word
// first). Consensus-fixed; changing any word breaks verifier compatibility.

/// Initial state of finalization lane 0.
pub const HASH_STATE0: [u32; 4] = [0x3fe4_9f5d, 0x30ac_8d93, 0x5994_3385, 0x9d04_b0ae];
/// Initial state of finalization lane 1.
pub const HASH_STATE1: [u32; 4] = [0x7b0c_6064, 0xa724_ecd3, 0xddc1_0935, 0x8a39_ebf1];
/// Initial state of finalization lane 2.
pub const HASH_STATE2: [u32; 4] = [0xfb53_82e3, 0x7c12_ecf7, 0xdf01_edda, 0x7ec7_0420];
/// Initial state of finalization lane 3.
pub const HASH_STATE3: [u32; 4] = [0x7728_b705, 0xb2e7_4109, 0x5082_d1c8, 0x94a9_d201];

/// First extra-round key of the finalization hash.
pub const HASH_XKEY0: [u32; 4] = [0xc376_7b17, 0x8231_a744, 0x053b_d705, 0x4ff6_37c5];
/// Second extra-round key of the finalization hash.
pub const HASH_XKEY1: [u32; 4] = [0x8a8f_ae2e, 0xb01d_a200, 0xa887_9d58, 0x6594_a1a6];

// =============================================================================
// GENERATOR KEYS — frac(ln(p)) for the first eight primes
// =============================================================================

/// Fixed round keys of the 4-lane keystream generator, one 128-bit key per
/// lane, listed as (low, high) 64-bit halves.
pub const FILL_KEYS: [(u64, u64); 4] = [
    (0xB172_17F7_D1CF_79AB, 0x193E_A7AA_D030_A976), // ln(2), ln(3)
    (0x9C04_1F7E_D8D3_36AF, 0xF227_2AE3_25A5_7546), // ln(5), ln(7)
    (0x65DC_76EF_E6E9_76F7, 0x90A0_8566_318A_1FD0), // ln(11), ln(13)
    (0xD54D_783F_4FEF_39DF, 0xF1C6_C0C0_9665_8E40), // ln(17), ln(19)
];

// =============================================================================
// COMPILE-TIME INVARIANTS
// =============================================================================

const_assert!(CACHE_SIZE.is_power_of_two());
const_assert!(DATASET_SIZE.is_power_of_two());
const_assert_eq!(CACHE_SIZE % CACHE_LINE_SIZE, 0);
const_assert_eq!(DATASET_SIZE % CACHE_LINE_SIZE as u64, 0);
const_assert!((CACHE_SIZE / CACHE_LINE_SIZE) as u64 <= 1 << 32);
const_assert!(DATASET_SIZE / CACHE_LINE_SIZE as u64 <= 1 << 32);
const_assert_eq!(REGISTERS_COUNT * core::mem::size_of::<u64>(), CACHE_LINE_SIZE);
const_assert!(SEED_SIZE < CACHE_LINE_SIZE);
const_assert_eq!(KEYS_COUNT, 8);
