//! Consistency & Regression Tests
//!
//! Verifies cross-backend agreement and deterministic expansion:
//! - Hardware vs portable block initialization and finalization
//! - Cache determinism across instances and seed sensitivity
//! - Parallel vs serial dataset initialization (disjoint worker ranges)
//! - Finalization digest stability and per-lane diffusion

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use graviton::{AesBackend, Cache, DatasetLine, KeysContainer};
use std::sync::{Arc, OnceLock};

const TEST_SEED: &[u8; 32] = b"graviton test seed 0123456789abc";

static CACHE: OnceLock<Arc<Cache>> = OnceLock::new();

/// One initialized cache shared by every test in this binary (expanding
/// 256 MiB per test would dominate the suite's runtime).
fn test_cache() -> Arc<Cache> {
    CACHE
        .get_or_init(|| {
            let mut cache = Cache::allocate(false).expect("cache allocation failed");
            cache.initialize(TEST_SEED, &AesBackend::auto());
            Arc::new(cache)
        })
        .clone()
}

fn init_one(cache: &Cache, backend: &AesBackend, block: u32) -> DatasetLine {
    let mut line = DatasetLine::default();
    backend.init_block(cache.bytes(), &mut line, block, cache.keys());
    line
}

// =============================================================================
// BACKEND EQUIVALENCE
// =============================================================================

#[cfg(target_arch = "x86_64")]
#[test]
fn test_aes_primitives_agree() {
    use graviton::kernels::aesni;
    use graviton::kernels::portable::utils::{aesdec, aesenc, U128};
    use rand::prelude::*;

    if AesBackend::hardware().is_none() {
        eprintln!("skipping: AES-NI not available");
        return;
    }
    let mut rng = rand::rng();
    for _ in 0..64 {
        let state = U128::from_u64s(rng.random(), rng.random());
        let key = U128::from_u64s(rng.random(), rng.random());
        // SAFETY: hardware support verified above.
        #[allow(unsafe_code)]
        let (hw_enc, hw_dec) = unsafe { (aesni::aesenc(state, key), aesni::aesdec(state, key)) };
        assert_eq!(hw_enc, aesenc(state, key), "aesenc diverged on {state:?}");
        assert_eq!(hw_dec, aesdec(state, key), "aesdec diverged on {state:?}");
    }
}

#[test]
fn test_init_block_backends_agree() {
    let Some(hw) = AesBackend::hardware() else {
        eprintln!("skipping: AES-NI not available");
        return;
    };
    let sw = AesBackend::software();
    let cache = test_cache();

    // First block, an arbitrary interior block, and the last dataset block.
    for block in [0u32, 1, 0x0012_3456, (1u32 << 26) - 1] {
        let line_hw = init_one(&cache, &hw, block);
        let line_sw = init_one(&cache, &sw, block);
        assert_eq!(
            line_hw, line_sw,
            "hardware and portable kernels diverged on block {block}"
        );
    }
}

#[test]
fn test_finalization_backends_agree() {
    let Some(hw) = AesBackend::hardware() else {
        eprintln!("skipping: AES-NI not available");
        return;
    };
    let sw = AesBackend::software();

    for size in [64usize, 128, 1024, 4096] {
        let mut input = vec![0u8; size];
        for (i, byte) in input.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        let mut digest_hw = [0u8; 64];
        let mut digest_sw = [0u8; 64];
        hw.hash_aes_1r_x4(&input, &mut digest_hw);
        sw.hash_aes_1r_x4(&input, &mut digest_sw);
        assert_eq!(
            digest_hw, digest_sw,
            "finalization digests diverged at input size {size}"
        );
    }
}

#[test]
fn test_generator_backends_agree() {
    let Some(hw) = AesBackend::hardware() else {
        eprintln!("skipping: AES-NI not available");
        return;
    };
    let sw = AesBackend::software();

    let seed_state = [0x5au8; 64];
    let mut state_hw = seed_state;
    let mut state_sw = seed_state;
    let mut out_hw = vec![0u8; 512];
    let mut out_sw = vec![0u8; 512];
    hw.fill_aes_1r_x4(&mut state_hw, &mut out_hw);
    sw.fill_aes_1r_x4(&mut state_sw, &mut out_sw);
    assert_eq!(out_hw, out_sw, "generator keystreams diverged");
    assert_eq!(state_hw, state_sw, "generator states diverged");
}

#[test]
fn test_generator_stream_is_continuous() {
    let backend = AesBackend::auto();
    let seed_state = [0xc3u8; 64];

    let mut whole_state = seed_state;
    let mut whole = vec![0u8; 256];
    backend.fill_aes_1r_x4(&mut whole_state, &mut whole);

    let mut split_state = seed_state;
    let mut first = vec![0u8; 64];
    let mut rest = vec![0u8; 192];
    backend.fill_aes_1r_x4(&mut split_state, &mut first);
    backend.fill_aes_1r_x4(&mut split_state, &mut rest);

    assert_eq!(&whole[..64], &first[..], "keystream head mismatch");
    assert_eq!(&whole[64..], &rest[..], "keystream continuation mismatch");
    assert_eq!(whole_state, split_state, "state mismatch after split fill");
}

// =============================================================================
// CACHE DETERMINISM
// =============================================================================

#[test]
fn test_cache_is_deterministic() {
    let first = test_cache();
    let mut second = Cache::allocate(false).expect("cache allocation failed");
    second.initialize(TEST_SEED, &AesBackend::auto());

    assert_eq!(first.keys(), second.keys(), "round keys diverged");

    // Sample lines across the whole buffer rather than comparing 256 MiB.
    let len = first.bytes().len();
    for offset in [0usize, 64, 4096, len / 2, len - 64] {
        assert_eq!(
            &first.bytes()[offset..offset + 64],
            &second.bytes()[offset..offset + 64],
            "cache bytes diverged at offset {offset}"
        );
    }

    let backend = AesBackend::auto();
    assert_eq!(
        init_one(&first, &backend, 0),
        init_one(&second, &backend, 0),
        "block 0 diverged between identically seeded caches"
    );
}

#[test]
fn test_cache_depends_on_seed() {
    let baseline = test_cache();
    let mut other_seed = *TEST_SEED;
    other_seed[0] ^= 1;

    let mut other = Cache::allocate(false).expect("cache allocation failed");
    other.initialize(&other_seed, &AesBackend::auto());

    assert_ne!(
        baseline.keys(),
        other.keys(),
        "distinct seeds produced identical round keys"
    );
    assert_ne!(
        &baseline.bytes()[..64],
        &other.bytes()[..64],
        "distinct seeds produced identical cache prefixes"
    );
}

#[test]
fn test_keys_are_populated() {
    let cache = test_cache();
    assert_ne!(
        cache.keys(),
        &KeysContainer::default(),
        "initialize left the key schedule zeroed"
    );
}

// =============================================================================
// PARALLEL INITIALIZATION
// =============================================================================

#[test]
fn test_worker_ranges_match_serial_init() {
    let cache = test_cache();
    let backend = AesBackend::auto();
    const START: u32 = 1_000;
    const COUNT: usize = 2_048;

    // Serial reference sweep.
    let mut expected = vec![DatasetLine::default(); COUNT];
    for (i, line) in expected.iter_mut().enumerate() {
        backend.init_block(cache.bytes(), line, START + i as u32, cache.keys());
    }

    // 8 scoped workers over disjoint ranges.
    let mut split = vec![DatasetLine::default(); COUNT];
    std::thread::scope(|scope| {
        for (w, chunk) in split.chunks_mut(COUNT / 8).enumerate() {
            let cache = &cache;
            scope.spawn(move || {
                let first = START + (w * (COUNT / 8)) as u32;
                graviton::init_lines(cache, backend, chunk, first);
            });
        }
    });
    assert_eq!(expected, split, "worker ranges diverged from serial sweep");

    // Single rayon-driven sweep over the whole range.
    let mut fanned = vec![DatasetLine::default(); COUNT];
    graviton::init_lines(&cache, backend, &mut fanned, START);
    assert_eq!(expected, fanned, "fanned sweep diverged from serial sweep");
}

// =============================================================================
// FINALIZATION DIGEST PROPERTIES
// =============================================================================

#[test]
fn test_digest_is_stable_and_length_sensitive() {
    let zeros64 = [0u8; 64];
    let zeros128 = [0u8; 128];

    let d1 = graviton::hash_aes_1r_x4(&zeros64);
    let d2 = graviton::hash_aes_1r_x4(&zeros64);
    assert_eq!(d1, d2, "digest not deterministic");
    assert_ne!(d1, [0u8; 64], "digest degenerated to zero");

    let d3 = graviton::hash_aes_1r_x4(&zeros128);
    assert_ne!(d1, d3, "64- and 128-byte zero inputs must not collide");

    let ramp: Vec<u8> = (0u8..0x80).collect();
    let d4 = graviton::hash_aes_1r_x4(&ramp);
    assert_ne!(d3, d4, "ramp input collided with zero input");
}

#[test]
fn test_digest_lane_diffusion() {
    // Each 16-byte input column feeds one lane; a single flipped bit must
    // scatter across that lane's 128 output bits after the extra rounds.
    let base_input: [u8; 64] = [0u8; 64];
    let d_base = graviton::hash_aes_1r_x4(&base_input);

    for bit in [0usize, 7, 100, 130, 255, 300, 402, 511] {
        let mut input = base_input;
        input[bit / 8] ^= 1 << (bit % 8);
        let d = graviton::hash_aes_1r_x4(&input);

        let lane = (bit / 8) / 16;
        let mut lane_flips = 0u32;
        for i in lane * 16..(lane + 1) * 16 {
            lane_flips += (d_base[i] ^ d[i]).count_ones();
        }
        assert!(
            lane_flips >= 32,
            "flipping input bit {bit} changed only {lane_flips} bits of lane {lane}"
        );
    }
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

#[test]
fn test_aes_bench_completes() {
    graviton::aes_bench(16, &AesBackend::auto());
    graviton::aes_bench(4, &AesBackend::software());
}

#[test]
fn test_active_backend_is_named() {
    let name = graviton::active_backend();
    assert!(
        name == "AES-NI" || name == "Portable",
        "unexpected backend name: {name}"
    );
}
