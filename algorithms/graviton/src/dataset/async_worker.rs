//! Async Prefetch Worker
//!
//! Producer-consumer boundary between a VM thread and a block-recomputation
//! thread. The VM submits the next line address right after each read; the
//! worker recomputes it from the cache while the VM executes, so the
//! blocking `get_block` at the following read usually returns immediately.

#![allow(clippy::cast_possible_truncation)]

use crate::cache::Cache;
use crate::engine::dispatcher::AesBackend;
use crate::kernels::constants::CACHE_LINE_SIZE;
use crate::types::DatasetLine;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread::JoinHandle;

// =============================================================================
// WORKER INTERFACE
// =============================================================================

/// Block provider for async-light dataset reads.
pub trait LightClientAsyncWorker: Send + Sync {
    /// Submit a prefetch request for the line at `address`.
    fn prepare_block(&self, address: u32);

    /// Return the line at `address`, blocking until its recomputation
    /// completes. Never requested addresses are computed on demand, so a
    /// missing `prepare_block` degrades to light-mode latency instead of
    /// deadlocking.
    fn get_block(&self, address: u32) -> DatasetLine;
}

// =============================================================================
// IMPLEMENTATION
// =============================================================================

struct State {
    pending: VecDeque<u32>,
    in_flight: Option<u32>,
    ready: HashMap<u32, DatasetLine>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    work: Condvar,
    done: Condvar,
}

/// A prefetch worker backed by one recomputation thread over a shared cache.
pub struct AsyncBlockWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl AsyncBlockWorker {
    /// Start the recomputation thread over `cache`.
    pub fn spawn(cache: Arc<Cache>, backend: AesBackend) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                pending: VecDeque::new(),
                in_flight: None,
                ready: HashMap::new(),
                shutdown: false,
            }),
            work: Condvar::new(),
            done: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::spawn(move || run(&cache, backend, &thread_shared));
        Self {
            shared,
            handle: Some(handle),
        }
    }
}

fn run(cache: &Cache, backend: AesBackend, shared: &Shared) {
    loop {
        let block = {
            let mut state = shared.state.lock();
            loop {
                if state.shutdown {
                    return;
                }
                if let Some(block) = state.pending.pop_front() {
                    state.in_flight = Some(block);
                    break block;
                }
                shared.work.wait(&mut state);
            }
        };

        let mut line = DatasetLine::default();
        backend.init_block(cache.bytes(), &mut line, block, cache.keys());

        let mut state = shared.state.lock();
        state.ready.insert(block, line);
        state.in_flight = None;
        shared.done.notify_all();
    }
}

impl LightClientAsyncWorker for AsyncBlockWorker {
    fn prepare_block(&self, address: u32) {
        let block = address / CACHE_LINE_SIZE as u32;
        let mut state = self.shared.state.lock();
        if state.ready.contains_key(&block)
            || state.in_flight == Some(block)
            || state.pending.contains(&block)
        {
            return;
        }
        state.pending.push_back(block);
        self.shared.work.notify_one();
    }

    fn get_block(&self, address: u32) -> DatasetLine {
        let block = address / CACHE_LINE_SIZE as u32;
        let mut state = self.shared.state.lock();
        loop {
            if let Some(line) = state.ready.remove(&block) {
                return line;
            }
            if state.in_flight != Some(block) && !state.pending.contains(&block) {
                state.pending.push_front(block);
                self.shared.work.notify_one();
            }
            self.shared.done.wait(&mut state);
        }
    }
}

impl Drop for AsyncBlockWorker {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.work.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
