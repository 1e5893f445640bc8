//! Notification surface abstraction.

use std::future::Future;

use murmur_core::{NotificationEvent, Permission};

/// Platform capability that shows user-visible alerts.
///
/// The surface owns the permission state. The session reads it once at
/// start, asks for it at most once, and never fires without it.
///
/// # Implementations
///
/// - **Terminal**: prints alerts inline
/// - **Simulation**: records alerts and deduplicates by tag
pub trait NotificationSurface: Clone + Send + Sync + 'static {
    /// Permission as currently known to the platform.
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Resolves to the final decision.
    fn request_permission(&self) -> impl Future<Output = Permission> + Send;

    /// Show an alert.
    ///
    /// Implementations must show at most one alert per `event.tag`.
    fn fire(&self, event: &NotificationEvent);
}
