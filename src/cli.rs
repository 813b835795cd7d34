//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

use crate::backend::BackendClientBuilder;

/// knowrn - ask questions to a KnowRN RAG backend
#[derive(Debug, Parser)]
#[command(name = "knowrn")]
#[command(about = "Ask questions to a KnowRN RAG backend and see the cited sources")]
#[command(version)]
pub struct Cli {
    /// Base URL of the backend query service [env: KNOWRN_BACKEND_URL] [default: http://127.0.0.1:8000]
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Request timeout in seconds; 0 waits forever [env: KNOWRN_TIMEOUT_SECS]
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask a single question and print the answer with its sources
    Ask(AskCommand),
    /// Ask every question listed in a file, one per line
    Batch(BatchCommand),
    /// Check that the backend is reachable
    Ping,
    /// Launch interactive terminal UI
    Tui,
}

/// Ask a single question
#[derive(Debug, Parser)]
pub struct AskCommand {
    /// The question to send
    #[arg(value_name = "QUESTION")]
    pub question: String,
}

/// Ask questions from a file
#[derive(Debug, Parser)]
pub struct BatchCommand {
    /// File with one question per line; blank lines and `#` comments are skipped
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

impl Cli {
    /// Returns a client builder carrying the URL and timeout flags.
    ///
    /// Flags that were not given are left unset so the builder falls back to the
    /// environment and then to its defaults.
    pub fn client_builder(&self) -> BackendClientBuilder {
        let mut builder = BackendClientBuilder::new();
        if let Some(url) = &self.backend_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }

    /// Returns true when the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Commands::Tui)
    }
}
