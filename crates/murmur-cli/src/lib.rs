//! Terminal front end for murmur.
//!
//! A thin shell over [`murmur_client::Session`]: reads lines from stdin,
//! prints the transcript on every view change, and shows notifications
//! inline. All sync logic lives in `murmur-client`.
//!
//! This crate only handles terminal I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod render;
pub mod runtime;
pub mod terminal;

pub use render::{EMPTY_TEXT, LOADING_TEXT, SEND_FAILED_TEXT, render_message, render_view};
pub use runtime::{ChatConfig, DEFAULT_HISTORY, QUIT_COMMAND, RuntimeError, run};
pub use terminal::{Console, NotificationMode, SilentSurface, TerminalSurface};
