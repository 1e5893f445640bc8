//! Environment abstraction for deterministic testing.
//!
//! Decouples message timestamps from the system clock. Production code uses
//! wall-clock time; simulation advances a virtual clock by hand so that
//! ordering scenarios are reproducible.

/// Abstract environment providing the current time.
///
/// # Invariants
///
/// Implementations MUST return milliseconds since the Unix epoch. Unlike a
/// monotonic clock, wall-clock readings may jump; ordering in this crate only
/// relies on the values as stored, never on the clock being monotone.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}
