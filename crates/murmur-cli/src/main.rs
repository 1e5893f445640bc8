//! murmur terminal chat.
//!
//! # Usage
//!
//! ```bash
//! # Chat alone
//! murmur --name alice
//!
//! # Chat with a simulated reader so receipts turn into ✓✓
//! murmur --name alice --peer bob --notifications granted
//! ```

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use murmur_client::{DEFAULT_INBOX_CAPACITY, DEFAULT_MESSAGES_PATH, SessionConfig};
use murmur_cli::{ChatConfig, Console, DEFAULT_HISTORY, NotificationMode, run};
use murmur_core::DisplayName;
use murmur_store::MemoryStore;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// murmur group chat
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "Real-time group chat in the terminal")]
#[command(version)]
struct Args {
    /// Display name to chat as
    #[arg(short, long)]
    name: String,

    /// Display name of a simulated participant that reads along
    #[arg(short, long)]
    peer: Option<String>,

    /// Notification permission
    #[arg(long, value_enum, default_value = "ask")]
    notifications: NotificationMode,

    /// Store path of the messages collection
    #[arg(long, default_value = DEFAULT_MESSAGES_PATH)]
    path: String,

    /// Number of recent messages to show
    #[arg(long, default_value_t = DEFAULT_HISTORY)]
    history: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn report(message: &str) -> ExitCode {
    let _ = writeln!(io::stderr(), "murmur: {message}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let name = match DisplayName::parse(&args.name) {
        Ok(name) => name,
        Err(error) => return report(&error.to_string()),
    };
    let peer = match args.peer.as_deref().map(DisplayName::parse).transpose() {
        Ok(peer) => peer,
        Err(error) => return report(&format!("peer: {error}")),
    };

    let config = ChatConfig {
        name,
        peer,
        notifications: args.notifications,
        session: SessionConfig { messages_path: args.path, inbox_capacity: DEFAULT_INBOX_CAPACITY },
        history: args.history,
    };

    tracing::info!(name = %config.name, "murmur starting");

    let input = BufReader::new(tokio::io::stdin());
    match run(config, MemoryStore::new(), input, Console::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(&error.to_string()),
    }
}
