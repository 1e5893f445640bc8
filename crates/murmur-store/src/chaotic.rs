//! Chaotic store wrapper for fault injection testing
//!
//! Store wrapper that randomly fails writes to exercise the client's recovery
//! paths. Read receipts must self-heal and sends must surface a retryable
//! error; both are only observable when writes actually fail.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use murmur_core::MessageId;
use serde_json::Value;

use super::{ExternalStore, StoreError, Subscription};

const INJECTED_FAILURE: &str = "chaotic failure injection";

/// Chaotic store wrapper that randomly injects write failures
///
/// Delegates to an underlying store but fails `append` and `update` based on
/// a configured failure rate. Subscriptions pass through untouched; a failed
/// write never reaches the inner store, so subscribers see nothing for it.
#[derive(Clone)]
pub struct ChaoticStore<S: ExternalStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operations attempted, failed or not
    operation_count: Arc<AtomicUsize>,
}

/// Linear congruential generator. Same seed, same failure pattern.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: ExternalStore> ChaoticStore<S> {
    /// Create a new chaotic wrapper
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of store operations attempted, including subscribes.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::Relaxed)
    }

    /// Count the operation and roll for failure.
    fn roll(&self) -> Result<(), StoreError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);
        let fail = self
            .rng
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .should_fail(self.failure_rate);

        if fail {
            tracing::trace!("injecting store failure");
            return Err(StoreError::Unavailable(INJECTED_FAILURE.to_owned()));
        }
        Ok(())
    }
}

impl<S: ExternalStore> ExternalStore for ChaoticStore<S> {
    fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribe(path)
    }

    fn append(
        &self,
        path: &str,
        record: Value,
    ) -> impl Future<Output = Result<MessageId, StoreError>> + Send {
        // Roll now so the failure pattern follows call order, not poll order
        let rolled = self.roll();
        let inner = self.inner.clone();
        let path = path.to_owned();
        async move {
            rolled?;
            inner.append(&path, record).await
        }
    }

    fn update(
        &self,
        path: &str,
        writes: Vec<(String, Value)>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let rolled = self.roll();
        let inner = self.inner.clone();
        let path = path.to_owned();
        async move {
            rolled?;
            inner.update(&path, writes).await
        }
    }
}
