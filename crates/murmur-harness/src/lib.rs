//! Deterministic simulation harness for murmur sessions.
//!
//! In-process implementations of the environment and notification surface,
//! plus a multi-session [`World`] for reproducible convergence testing.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the checks
//! that hold at every instant and [`InvariantRegistry::settled()`] once the
//! world has settled.
//!
//! # Scenarios
//!
//! [`scenario::generate`] expands a seed into a reproducible list of
//! [`Operation`]s that a [`World`] can apply.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod recording_store;
pub mod scenario;
pub mod sim_env;
pub mod surface;
pub mod world;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, LoadingOnlyAtStart, MessagesSorted, NoSelfSeen,
    SeenMonotonic, SessionSnapshot, SystemSnapshot, UniqueIds, ViewConvergence, Violation,
};
pub use recording_store::RecordingStore;
pub use scenario::{Operation, SmallText};
pub use sim_env::SimEnv;
pub use surface::RecordingSurface;
pub use world::{Participant, World};
