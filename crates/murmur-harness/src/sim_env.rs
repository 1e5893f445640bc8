//! Simulated environment with a manually driven clock.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use murmur_core::Environment;

/// Environment whose clock only moves when told to.
///
/// Clones share the clock, so every session in a simulation sees the same
/// time. Two messages sent without advancing in between carry the same
/// timestamp, which is how tie ordering gets exercised.
#[derive(Debug, Clone)]
pub struct SimEnv {
    now: Arc<AtomicU64>,
}

impl SimEnv {
    /// Clock starting at `start_millis`.
    pub fn new(start_millis: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(start_millis)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute time, forwards or backwards.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        // 2024-01-01T00:00:00Z
        Self::new(1_704_067_200_000)
    }
}

impl Environment for SimEnv {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
