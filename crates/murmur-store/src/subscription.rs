//! Scoped subscription handle.
//!
//! A [`Subscription`] is the only way to receive snapshots. Releasing it,
//! explicitly or by dropping it, unregisters the listener from the store, so
//! a session can never leak a live subscription whatever way it ends.

use murmur_core::Snapshot;
use tokio::sync::mpsc;

use crate::StoreError;

/// One delivery on a subscription: the new collection state (`None` when the
/// collection is empty or absent), or a stream failure.
pub type Delivery = Result<Option<Snapshot>, StoreError>;

/// Live snapshot stream for one collection.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Delivery>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a delivery channel. `release` runs exactly once, when the
    /// subscription is unsubscribed or dropped.
    pub fn new(
        receiver: mpsc::UnboundedReceiver<Delivery>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self { receiver, release: Some(Box::new(release)) }
    }

    /// Wait for the next delivery. `None` once the store closed the stream.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    /// Next delivery if one is already queued.
    pub fn try_next(&mut self) -> Option<Delivery> {
        self.receiver.try_recv().ok()
    }

    /// Stop receiving and unregister from the store.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("released", &self.release.is_none()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn counting_subscription() -> (Subscription, Arc<AtomicUsize>, mpsc::UnboundedSender<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let subscription = Subscription::new(receiver, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (subscription, released, sender)
    }

    #[test]
    fn drop_releases_once() {
        let (subscription, released, _sender) = counting_subscription();
        drop(subscription);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_releases_once() {
        let (subscription, released, _sender) = counting_subscription();
        subscription.unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn queued_deliveries_are_readable() {
        let (mut subscription, _released, sender) = counting_subscription();
        sender.send(Ok(None)).unwrap();

        assert!(matches!(subscription.try_next(), Some(Ok(None))));
        assert!(subscription.try_next().is_none());
    }
}
