//! Session runtime.
//!
//! A session binds one viewer to one subscription. [`Session::start`]
//! subscribes, then spawns a task that is the single consumer of three
//! inputs:
//!
//! - snapshot deliveries from the subscription
//! - the inbox, carrying permission results back in
//! - the shutdown signal from the [`SessionHandle`]
//!
//! The task feeds each input to its [`SyncEngine`] and executes the resulting
//! actions, so at most one cycle runs at a time. Seen writes and permission
//! requests run on their own tasks and never hold up the next cycle.
//!
//! The task owns the [`Subscription`]. However the session ends (explicit
//! [`SessionHandle::end`], dropped handle, runtime shutdown) the subscription
//! is dropped with it and unregisters from the store.

use murmur_core::{DisplayName, Environment, MessageId, OutgoingMessage};
use murmur_store::{ExternalStore, Subscription};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    ClientError, NotificationSurface, SessionConfig, SyncAction, SyncEngine, SyncEvent,
    view::ChatView,
};

/// Entry point for starting chat sessions.
pub struct Session;

impl Session {
    /// Subscribe to the messages collection and start processing snapshots.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S, N, E>(
        store: S,
        surface: N,
        env: E,
        viewer: DisplayName,
        config: SessionConfig,
    ) -> Result<SessionHandle<S, E>, ClientError>
    where
        S: ExternalStore,
        N: NotificationSurface,
        E: Environment,
    {
        let subscription =
            store.subscribe(&config.messages_path).map_err(ClientError::Subscribe)?;

        let engine = SyncEngine::new(viewer.as_str(), surface.permission());
        let (view_tx, view_rx) = watch::channel(engine.view());
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = SessionTask {
            engine,
            store: store.clone(),
            surface,
            path: config.messages_path.clone(),
            subscription,
            inbox_tx,
            inbox_rx,
            shutdown: shutdown_rx,
            view: view_tx,
        };

        tracing::info!(viewer = %viewer, path = %config.messages_path, "session started");
        let task = tokio::spawn(task.run());

        Ok(SessionHandle {
            viewer,
            store,
            env,
            path: config.messages_path,
            view: view_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Handle to a running session.
///
/// Dropping the handle ends the session.
pub struct SessionHandle<S: ExternalStore, E: Environment> {
    viewer: DisplayName,
    store: S,
    env: E,
    path: String,
    view: watch::Receiver<ChatView>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<S: ExternalStore, E: Environment> SessionHandle<S, E> {
    /// Display name of the session's user.
    pub fn viewer(&self) -> &DisplayName {
        &self.viewer
    }

    /// Append a message authored by this session's user.
    ///
    /// Text is trimmed; blank text is rejected before reaching the store. The
    /// message shows up locally only once a snapshot carries it back.
    pub async fn send(&self, text: &str) -> Result<MessageId, ClientError> {
        let message = OutgoingMessage::new(text, self.viewer.as_str(), self.env.now_millis())
            .map_err(|_| ClientError::EmptyMessage)?;

        match self.store.append(&self.path, message.to_record()).await {
            Ok(id) => {
                tracing::debug!(viewer = %self.viewer, %id, "message sent");
                Ok(id)
            },
            Err(e) => {
                tracing::warn!(viewer = %self.viewer, error = %e, "send failed");
                Err(ClientError::SendFailed(e))
            },
        }
    }

    /// Current view.
    pub fn view(&self) -> ChatView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.view.clone()
    }

    /// `Err` once the live subscription has failed.
    pub fn check(&self) -> Result<(), ClientError> {
        match &self.view.borrow().stale {
            Some(reason) => Err(ClientError::Subscription { reason: reason.clone() }),
            None => Ok(()),
        }
    }

    /// End the session and wait for its task to finish.
    ///
    /// On return the subscription has been released.
    pub async fn end(mut self) -> Result<(), ClientError> {
        if let Some(shutdown) = self.shutdown.take() {
            // Task may already be gone; the join below reports how it ended
            let _ = shutdown.send(());
        }
        match self.task.take() {
            Some(task) => task.await.map_err(|e| ClientError::Shutdown(e.to_string())),
            None => Ok(()),
        }
    }
}

impl<S: ExternalStore, E: Environment> Drop for SessionHandle<S, E> {
    fn drop(&mut self) {
        // Dropping the sender wakes the task's shutdown branch
        self.shutdown.take();
    }
}

impl<S: ExternalStore, E: Environment> std::fmt::Debug for SessionHandle<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("viewer", &self.viewer)
            .field("path", &self.path)
            .field("running", &self.task.as_ref().is_some_and(|t| !t.is_finished()))
            .finish_non_exhaustive()
    }
}

struct SessionTask<S, N> {
    engine: SyncEngine,
    store: S,
    surface: N,
    path: String,
    subscription: Subscription,
    inbox_tx: mpsc::Sender<SyncEvent>,
    inbox_rx: mpsc::Receiver<SyncEvent>,
    shutdown: oneshot::Receiver<()>,
    view: watch::Sender<ChatView>,
}

impl<S: ExternalStore, N: NotificationSurface> SessionTask<S, N> {
    async fn run(mut self) {
        let mut live = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown => break,

                delivery = self.subscription.next(), if live => {
                    let event = match delivery {
                        Some(Ok(snapshot)) => SyncEvent::SnapshotReceived(snapshot),
                        Some(Err(e)) => {
                            live = false;
                            SyncEvent::SubscriptionFailed { reason: e.to_string() }
                        },
                        None => {
                            live = false;
                            SyncEvent::SubscriptionFailed { reason: "subscription closed".into() }
                        },
                    };
                    self.dispatch(event);
                },

                Some(event) = self.inbox_rx.recv() => self.dispatch(event),
            }
        }

        self.subscription.unsubscribe();
        tracing::info!(viewer = %self.engine.viewer(), "session ended");
    }

    fn dispatch(&mut self, event: SyncEvent) {
        for action in self.engine.handle(event) {
            self.execute(action);
        }
    }

    fn execute(&self, action: SyncAction) {
        match action {
            SyncAction::WriteSeen(updates) => {
                let store = self.store.clone();
                let path = self.path.clone();
                let viewer = self.engine.viewer().to_owned();
                tokio::spawn(async move {
                    let count = updates.len();
                    match store.update(&path, updates.to_writes()).await {
                        Ok(()) => tracing::debug!(%viewer, count, "marked messages seen"),
                        Err(e) => {
                            let error = ClientError::SeenUpdateFailed(e);
                            tracing::warn!(%viewer, count, %error, "seen update failed");
                        },
                    }
                });
            },

            SyncAction::Notify(event) => {
                tracing::debug!(viewer = %self.engine.viewer(), id = %event.tag, "notifying");
                self.surface.fire(&event);
            },

            SyncAction::RequestPermission => {
                let surface = self.surface.clone();
                let inbox = self.inbox_tx.clone();
                tokio::spawn(async move {
                    let permission = surface.request_permission().await;
                    // Closed inbox means the session already ended
                    let _ = inbox.send(SyncEvent::PermissionResolved(permission)).await;
                });
            },

            SyncAction::Render => {
                self.view.send_replace(self.engine.view());
            },
        }
    }
}
