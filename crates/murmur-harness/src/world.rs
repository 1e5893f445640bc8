//! Multi-session simulation world.
//!
//! A [`World`] runs several sessions against one shared store and one shared
//! [`SimEnv`] clock, applies [`Operation`]s to them, and records every view
//! each session publishes so invariants can be checked afterwards.
//!
//! Must run on a current-thread tokio runtime: settling relies on yielding
//! to let every session task, seen write and permission request make
//! progress.

use murmur_client::{
    ChatView, ClientError, Session, SessionConfig, SessionHandle,
};
use murmur_core::{DisplayName, MessageId};
use murmur_store::ExternalStore;
use tokio::sync::watch;

use crate::{
    RecordingStore, RecordingSurface, SessionSnapshot, SimEnv, SystemSnapshot,
    scenario::Operation,
};

/// Consecutive idle yields after which the world counts as settled.
const QUIET_YIELDS: usize = 32;

/// Upper bound on yields spent in one settle.
const MAX_SETTLE_YIELDS: usize = 10_000;

/// One joined participant.
pub struct Participant<S: ExternalStore> {
    name: DisplayName,
    surface: RecordingSurface,
    store: RecordingStore<S>,
    handle: Option<SessionHandle<RecordingStore<S>, SimEnv>>,
    view: watch::Receiver<ChatView>,
    history: SessionSnapshot,
    sent: Vec<MessageId>,
    failed_sends: usize,
}

impl<S: ExternalStore> Participant<S> {
    /// Participant's display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Participant's notification surface.
    pub fn surface(&self) -> &RecordingSurface {
        &self.surface
    }

    /// Latest published view.
    pub fn view(&self) -> ChatView {
        self.view.borrow().clone()
    }

    /// Ids of the participant's acknowledged sends.
    pub fn sent(&self) -> &[MessageId] {
        &self.sent
    }

    /// Number of sends the store rejected.
    pub fn failed_sends(&self) -> usize {
        self.failed_sends
    }

    /// Whether the session is still running.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    fn record(&mut self) -> bool {
        let changed = self.view.has_changed().unwrap_or(false);
        let view = self.view.borrow_and_update().clone();
        self.history.record_view(view);
        changed
    }
}

/// Sessions sharing one store and one clock.
pub struct World<S: ExternalStore> {
    store: S,
    env: SimEnv,
    config: SessionConfig,
    participants: Vec<Participant<S>>,
}

impl<S: ExternalStore> World<S> {
    /// Empty world over `store` with the default clock and configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SimEnv::default(), SessionConfig::default())
    }

    /// Empty world with an explicit clock and configuration.
    pub fn with_config(store: S, env: SimEnv, config: SessionConfig) -> Self {
        Self { store, env, config, participants: Vec::new() }
    }

    /// Shared store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Shared clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Joined participants, in join order.
    pub fn participants(&self) -> &[Participant<S>] {
        &self.participants
    }

    /// Participant at `index`.
    ///
    /// # Panics
    ///
    /// Panics if no participant joined at `index`.
    pub fn participant(&self, index: usize) -> &Participant<S> {
        &self.participants[index]
    }

    /// Start a session for `name`. Returns the participant's index.
    pub fn join(
        &mut self,
        name: DisplayName,
        surface: RecordingSurface,
    ) -> Result<usize, ClientError> {
        let store = RecordingStore::new(self.store.clone());
        let handle = Session::start(
            store.clone(),
            surface.clone(),
            self.env.clone(),
            name.clone(),
            self.config.clone(),
        )?;
        let view = handle.watch();
        let mut history = SessionSnapshot::new(name.as_str());
        history.record_view(view.borrow().clone());

        self.participants.push(Participant {
            name,
            surface,
            store,
            handle: Some(handle),
            view,
            history,
            sent: Vec::new(),
            failed_sends: 0,
        });
        Ok(self.participants.len() - 1)
    }

    /// Send `text` as participant `index`.
    ///
    /// # Panics
    ///
    /// Panics if no participant joined at `index`.
    pub async fn send(&mut self, index: usize, text: &str) -> Result<MessageId, ClientError> {
        let participant = &mut self.participants[index];
        let Some(handle) = &participant.handle else {
            return Err(ClientError::Shutdown("session already ended".to_owned()));
        };

        let result = handle.send(text).await;
        match &result {
            Ok(id) => participant.sent.push(id.clone()),
            Err(ClientError::SendFailed(_)) => participant.failed_sends += 1,
            Err(_) => {},
        }
        result
    }

    /// End participant `index`'s session and wait for it to stop.
    pub async fn end(&mut self, index: usize) -> Result<(), ClientError> {
        let participant = &mut self.participants[index];
        participant.record();
        match participant.handle.take() {
            Some(handle) => handle.end().await,
            None => Ok(()),
        }
    }

    /// Drop participant `index`'s session handle without waiting.
    pub fn abandon(&mut self, index: usize) {
        let participant = &mut self.participants[index];
        participant.record();
        participant.handle.take();
    }

    /// Apply one scenario operation.
    pub async fn apply(&mut self, operation: &Operation) {
        match operation {
            Operation::Send { participant, text } => {
                if self.participants.is_empty() {
                    return;
                }
                let index = usize::from(*participant) % self.participants.len();
                let result = self.send(index, &text.to_text()).await;
                match result {
                    Err(ClientError::EmptyMessage) => debug_assert!(text.is_blank()),
                    Err(error) => tracing::debug!(index, %error, "scenario send failed"),
                    Ok(_) => {},
                }
            },
            Operation::AdvanceTime { millis } => self.env.advance(u64::from(*millis)),
            Operation::Settle => self.settle().await,
        }
    }

    /// Yield until no session has published anything for a while.
    ///
    /// Records every view observed on the way.
    pub async fn settle(&mut self) {
        let mut quiet = 0;
        for _ in 0..MAX_SETTLE_YIELDS {
            tokio::task::yield_now().await;

            let mut changed = false;
            for participant in &mut self.participants {
                changed |= participant.record();
            }

            if changed {
                quiet = 0;
            } else {
                quiet += 1;
                if quiet >= QUIET_YIELDS {
                    return;
                }
            }
        }
        tracing::warn!("world did not settle");
    }

    /// Observable history of every participant.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::from_sessions(
            self.participants
                .iter()
                .map(|participant| {
                    let mut history = participant.history.clone();
                    history.seen_writes = participant.store.seen_writes();
                    history.active = participant.is_active();
                    history
                })
                .collect(),
        )
    }
}
