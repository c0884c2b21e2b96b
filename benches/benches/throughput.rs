//! Graviton Criterion Benchmark
//!
//! Statistically rigorous measurements of the proof-of-work hot paths:
//! block initialization, dataset expansion, light reads, and finalization.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use graviton::{
    dataset_read_light, AesBackend, Cache, Dataset, DatasetLine, MemoryRegisters, RegisterFile,
};
use rand::prelude::*;
use std::hint::black_box;
use std::sync::{Arc, OnceLock};

const KB: usize = 1024;
const LINE: usize = 64;

static CACHE: OnceLock<Arc<Cache>> = OnceLock::new();

fn bench_cache() -> Arc<Cache> {
    CACHE
        .get_or_init(|| {
            let mut cache = Cache::allocate(false).expect("cache allocation failed");
            cache.initialize(b"graviton bench seed 0123456789ab", &AesBackend::auto());
            Arc::new(cache)
        })
        .clone()
}

fn backends() -> Vec<(&'static str, AesBackend)> {
    let mut list = vec![("portable", AesBackend::software())];
    if let Some(hw) = AesBackend::hardware() {
        list.push(("aesni", hw));
    }
    list
}

// =============================================================================
// BENCHMARK 1: BLOCK INITIALIZATION
// =============================================================================

/// Latency of deriving a single 64-byte dataset block.
fn bench_block_init(c: &mut Criterion) {
    let cache = bench_cache();
    let mut group = c.benchmark_group("1-Block-Init");
    group.throughput(Throughput::Bytes(LINE as u64));

    for (name, backend) in backends() {
        let mut line = DatasetLine::default();
        let mut block = 0u32;
        group.bench_function(name, |b| {
            b.iter(|| {
                backend.init_block(cache.bytes(), &mut line, black_box(block), cache.keys());
                block = block.wrapping_add(1);
                black_box(&line);
            });
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 2: DATASET EXPANSION
// =============================================================================

/// Throughput of fanned block generation (4 MiB of dataset per iteration).
fn bench_dataset_expansion(c: &mut Criterion) {
    let cache = bench_cache();
    let mut group = c.benchmark_group("2-Dataset-Expansion");
    group.sample_size(10);

    const LINES: usize = 1 << 16;
    group.throughput(Throughput::Bytes((LINES * LINE) as u64));

    let mut lines = vec![DatasetLine::default(); LINES];
    let backend = AesBackend::auto();
    let threads = num_cpus::get();
    group.bench_function(format!("4MiB/{threads}-threads"), |b| {
        b.iter(|| {
            graviton::init_lines(&cache, backend, &mut lines, 0);
            black_box(&lines);
        });
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 3: LIGHT READS
// =============================================================================

/// Latency of a recomputed (light-mode) dataset read.
fn bench_light_read(c: &mut Criterion) {
    let ds = Dataset::Light {
        cache: bench_cache(),
        backend: AesBackend::auto(),
    };
    let mut group = c.benchmark_group("3-Light-Read");
    group.throughput(Throughput::Bytes(LINE as u64));

    let mut rng = rand::rng();
    let mut mem = MemoryRegisters::default();
    let mut reg = RegisterFile::default();
    group.bench_function("recompute", |b| {
        b.iter(|| {
            dataset_read_light(&ds, rng.random::<u32>(), &mut mem, &mut reg);
            black_box(&reg);
        });
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 4: FINALIZATION
// =============================================================================

/// Scratchpad finalization throughput across input sizes.
fn bench_finalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("4-Finalization");

    let sizes = [(64, "64B"), (256, "256B"), (2 * KB, "2KB"), (16 * KB, "16KB")];
    for (size, name) in sizes {
        let mut input = vec![0u8; size];
        rand::rng().fill(&mut input[..]);
        group.throughput(Throughput::Bytes(size as u64));

        for (backend_name, backend) in backends() {
            let mut digest = [0u8; 64];
            group.bench_with_input(
                criterion::BenchmarkId::new(backend_name, name),
                &input,
                |b, data| {
                    b.iter(|| {
                        backend.hash_aes_1r_x4(black_box(data), &mut digest);
                        black_box(&digest);
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_block_init,
    bench_dataset_expansion,
    bench_light_read,
    bench_finalization
);
criterion_main!(benches);
