//! Terminal event loop.
//!
//! Runs the user's session (and optionally a simulated peer) against an
//! in-process store. Uses `tokio::select!` to interleave stdin lines with view
//! changes published by the session.

use std::io;

use chrono::Local;
use murmur_client::{ClientError, Session, SessionConfig, SystemEnv};
use murmur_core::DisplayName;
use murmur_store::MemoryStore;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    render::{SEND_FAILED_TEXT, render_view},
    terminal::{Console, NotificationMode, SilentSurface, TerminalSurface},
};

/// Input line that ends the session.
pub const QUIT_COMMAND: &str = "/quit";

/// Default number of messages rendered.
pub const DEFAULT_HISTORY: usize = 50;

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal input or output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Session error.
    #[error("session error: {0}")]
    Client(#[from] ClientError),
}

/// Everything the terminal needs to start chatting.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The user's display name.
    pub name: DisplayName,
    /// Simulated second participant, if any.
    pub peer: Option<DisplayName>,
    /// Notification permission behaviour.
    pub notifications: NotificationMode,
    /// Session settings shared by every participant.
    pub session: SessionConfig,
    /// Number of most recent messages rendered.
    pub history: usize,
}

/// Chat until `input` ends or the user quits.
///
/// Every participant shares `store`. Sessions are ended before returning.
pub async fn run<R>(
    config: ChatConfig,
    store: MemoryStore,
    input: R,
    console: Console,
) -> Result<(), RuntimeError>
where
    R: AsyncBufRead + Unpin,
{
    let surface = TerminalSurface::new(console.clone(), config.notifications);
    let session = Session::start(
        store.clone(),
        surface,
        SystemEnv::new(),
        config.name.clone(),
        config.session.clone(),
    )?;

    let peer = match &config.peer {
        Some(peer) => {
            let handle = Session::start(
                store,
                SilentSurface,
                SystemEnv::new(),
                peer.clone(),
                config.session.clone(),
            )?;
            let greeting = format!("Hi {}, {peer} here.", config.name);
            if let Err(error) = handle.send(&greeting).await {
                tracing::warn!(%error, "peer greeting failed");
            }
            Some(handle)
        },
        None => None,
    };

    let mut view = session.watch();
    let mut lines = input.lines();
    console.print_lines(&render_view(&view.borrow_and_update(), config.history, &Local))?;

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    tracing::warn!("session stopped publishing");
                    break;
                }
                let current = view.borrow_and_update().clone();
                let mut rendered = vec![String::new()];
                rendered.extend(render_view(&current, config.history, &Local));
                console.print_lines(&rendered)?;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                if text == QUIT_COMMAND {
                    break;
                }
                match session.send(text).await {
                    Ok(id) => tracing::debug!(%id, "message sent"),
                    Err(error) => {
                        tracing::warn!(%error, "send failed");
                        console.print_line(SEND_FAILED_TEXT)?;
                    },
                }
            }
        }
    }

    if let Some(peer) = peer {
        peer.end().await?;
    }
    session.end().await?;
    Ok(())
}
