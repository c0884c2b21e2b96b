//! # Graviton Stream Generator
//!
//! Streams raw dataset blocks or chained finalization digests to stdout for
//! statistical testing (`PractRand`), and prints single vectors for pinning
//! reference values.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use graviton::{AesBackend, Cache, DatasetLine};
use std::io::{self, Write};

/// Stream generator for statistical testing and reference vectors.
#[derive(Parser)]
#[command(name = "graviton_stream")]
struct Args {
    /// Cache seed (at most 32 bytes; zero-padded).
    #[arg(long, default_value = "graviton test seed 0123456789abc")]
    seed: String,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Stream consecutive dataset blocks derived from the cache.
    Blocks {
        /// First block number.
        #[arg(long, default_value_t = 0)]
        start: u32,
        /// Stop after this many blocks (stream forever when omitted).
        #[arg(long)]
        count: Option<u64>,
    },
    /// Stream a chain of finalization digests (each digest is the next input).
    Digests {
        /// Stop after this many digests (stream forever when omitted).
        #[arg(long)]
        count: Option<u64>,
    },
    /// Print one dataset block as hex and exit.
    Vector {
        /// Block number to derive.
        #[arg(long, default_value_t = 0)]
        block: u32,
    },
}

fn parse_seed(raw: &str) -> Result<[u8; 32]> {
    let bytes = raw.as_bytes();
    if bytes.len() > 32 {
        bail!("seed must be at most 32 bytes, got {}", bytes.len());
    }
    let mut seed = [0u8; 32];
    seed[..bytes.len()].copy_from_slice(bytes);
    Ok(seed)
}

fn line_bytes(line: &DatasetLine) -> [u8; 64] {
    let mut bytes = [0u8; 64];
    for (chunk, word) in bytes.chunks_exact_mut(8).zip(line.0) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
}

fn main() -> Result<()> {
    let args = Args::parse();
    let seed = parse_seed(&args.seed)?;
    let backend = AesBackend::auto();
    eprintln!("backend: {}", backend.name());

    let mut cache = Cache::allocate(false).context("cache allocation failed")?;
    cache.initialize(&seed, &backend);

    let stdout = io::stdout();
    let mut handle = io::BufWriter::new(stdout.lock());

    match args.mode {
        Mode::Blocks { start, count } => {
            let mut block = start;
            let mut emitted = 0u64;
            loop {
                if count.is_some_and(|c| emitted >= c) {
                    break;
                }
                let mut line = DatasetLine::default();
                backend.init_block(cache.bytes(), &mut line, block, cache.keys());
                if handle.write_all(&line_bytes(&line)).is_err() {
                    break;
                }
                block = block.wrapping_add(1);
                emitted += 1;
            }
        }
        Mode::Digests { count } => {
            let mut state = [0u8; 64];
            let mut emitted = 0u64;
            loop {
                if count.is_some_and(|c| emitted >= c) {
                    break;
                }
                let mut digest = [0u8; 64];
                backend.hash_aes_1r_x4(&state, &mut digest);
                if handle.write_all(&digest).is_err() {
                    break;
                }
                state = digest;
                emitted += 1;
            }
        }
        Mode::Vector { block } => {
            let mut line = DatasetLine::default();
            backend.init_block(cache.bytes(), &mut line, block, cache.keys());
            drop(handle);
            println!("{}", hex::encode(line_bytes(&line)));
        }
    }

    Ok(())
}
