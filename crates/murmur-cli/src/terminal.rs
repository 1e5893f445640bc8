//! Terminal output and notification surface.

#![allow(clippy::disallowed_types, reason = "Synchronous bookkeeping only")]

use std::{
    collections::HashSet,
    future::Future,
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use clap::ValueEnum;
use murmur_client::NotificationSurface;
use murmur_core::{MessageId, NotificationEvent, Permission};

/// Shared line-oriented output.
///
/// Session tasks and the input loop write through clones of the same console
/// so lines never interleave.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    /// Console over the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console over any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self { out: Arc::new(Mutex::new(Box::new(writer))) }
    }

    /// Write `lines`, one per line, and flush.
    pub fn print_lines<S: AsRef<str>>(&self, lines: &[S]) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            writeln!(out, "{}", line.as_ref())?;
        }
        out.flush()
    }

    /// Write a single line and flush.
    pub fn print_line(&self, line: &str) -> io::Result<()> {
        self.print_lines(&[line])
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// How the terminal answers for notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotificationMode {
    /// Start undecided; the session asks once and the terminal allows it.
    Ask,
    /// Already allowed.
    Granted,
    /// Already refused.
    Denied,
}

impl NotificationMode {
    /// Permission the surface reports before any request.
    pub fn initial_permission(self) -> Permission {
        match self {
            Self::Ask => Permission::Unknown,
            Self::Granted => Permission::Granted,
            Self::Denied => Permission::Denied,
        }
    }
}

#[derive(Debug)]
struct SurfaceState {
    permission: Permission,
    shown: HashSet<MessageId>,
}

/// Notification surface that prints alerts as `*` lines.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    console: Console,
    state: Arc<Mutex<SurfaceState>>,
}

impl TerminalSurface {
    /// Surface printing to `console`.
    pub fn new(console: Console, mode: NotificationMode) -> Self {
        let state = SurfaceState { permission: mode.initial_permission(), shown: HashSet::new() };
        Self { console, state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSurface for TerminalSurface {
    fn permission(&self) -> Permission {
        self.lock().permission
    }

    fn request_permission(&self) -> impl Future<Output = Permission> + Send {
        let decision = {
            let mut state = self.lock();
            if state.permission == Permission::Unknown {
                state.permission = Permission::Granted;
            }
            state.permission
        };
        if decision.is_granted() {
            let _ = self.console.print_line("* Notifications enabled");
        }
        std::future::ready(decision)
    }

    fn fire(&self, event: &NotificationEvent) {
        let fresh = {
            let mut state = self.lock();
            state.permission.is_granted() && state.shown.insert(event.tag.clone())
        };
        if !fresh {
            return;
        }
        if let Err(error) = self.console.print_line(&format!("* {}: {}", event.title, event.body)) {
            tracing::warn!(%error, "failed to print notification");
        }
    }
}

/// Surface for sessions that never alert, such as the simulated peer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSurface;

impl NotificationSurface for SilentSurface {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&self) -> impl Future<Output = Permission> + Send {
        std::future::ready(Permission::Denied)
    }

    fn fire(&self, _event: &NotificationEvent) {}
}
