use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use knowrn::cli::{AskCommand, BatchCommand, Cli, Commands};
use knowrn::commands::{self, Outcome};
use knowrn::utils::{ensure_parent_directory, get_log_path};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() {
    // A missing .env file is fine; variables may come from the real environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    };

    let result = match &cli.command {
        Commands::Ask(cmd) => handle_ask(&cli, cmd),
        Commands::Batch(cmd) => handle_batch(&cli, cmd),
        Commands::Ping => handle_ping(&cli),
        Commands::Tui => handle_tui(&cli),
    };

    match result {
        Ok(Outcome::Answered) => {}
        Ok(Outcome::Failed) => std::process::exit(2),
        Err(e) => {
            // Determine exit code based on error type
            let exit_code = if is_user_error(&e) { 1 } else { 2 };
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code);
        }
    }
}

/// Initializes tracing.
///
/// `RUST_LOG` wins over `-v`. Logs go to stderr, except in TUI mode where the
/// terminal is taken and they go to the log file instead.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if cli.is_interactive() {
        let log_path = get_log_path()?;
        ensure_parent_directory(&log_path)?;
        let dir = log_path
            .parent()
            .context("Log path has no parent directory")?;
        let file_name = log_path
            .file_name()
            .context("Log path has no file name")?;

        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(None)
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are validation failures like an empty question.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.to_string().contains("cannot be empty")
}

fn build_client(cli: &Cli) -> Result<knowrn::BackendClient> {
    let client = cli
        .client_builder()
        .build()
        .context("Failed to configure backend client")?;
    info!(url = %client.query_url(), "using backend");
    Ok(client)
}

fn handle_ask(cli: &Cli, cmd: &AskCommand) -> Result<Outcome> {
    // Validate before touching configuration so an empty question is always a user error.
    if cmd.question.is_empty() {
        anyhow::bail!("Question cannot be empty");
    }
    let client = build_client(cli)?;
    commands::execute_ask(&client, &cmd.question, &mut io::stdout().lock())
}

fn handle_batch(cli: &Cli, cmd: &BatchCommand) -> Result<Outcome> {
    let questions = commands::read_questions(&cmd.file)?;
    let client = build_client(cli)?;
    let summary = commands::execute_batch(&client, &questions, &mut io::stdout().lock())?;
    Ok(summary.outcome())
}

fn handle_ping(cli: &Cli) -> Result<Outcome> {
    let client = build_client(cli)?;
    commands::execute_ping(&client, &mut io::stdout().lock())
}

fn handle_tui(cli: &Cli) -> Result<Outcome> {
    let client = build_client(cli)?;
    knowrn::tui::run(Arc::new(client))?;
    Ok(Outcome::Answered)
}
