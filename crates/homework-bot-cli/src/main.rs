//! Homework Review Bot CLI
//!
//! Main entry point: checks credentials, then polls the homework API and
//! forwards review status changes to Telegram.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use homework_bot_core::{Config, Credentials, IterationOutcome, Notifier, Poller, PracticumClient};
use homework_bot_telegram::TelegramBot;
use tracing_subscriber::EnvFilter;

/// Homework Review Bot
///
/// Polls the homework review API and sends a Telegram message whenever the
/// review status of a submitted homework changes.
///
/// Requires PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID in the
/// environment or in a .env file.
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: homework-bot.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Homework status endpoint (overrides the config file)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Seconds to sleep between polls (overrides the config file)
    #[arg(long, value_name = "SECONDS")]
    retry_interval: Option<u64>,

    /// Run a single polling iteration and exit
    #[arg(long)]
    once: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // A missing .env is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("The bot was stopped.");
            ExitCode::from(1)
        }
    }
}

/// Startup checks followed by the polling loop.
async fn run(args: Args) -> anyhow::Result<()> {
    run_with(args, |name| std::env::var(name).ok()).await
}

/// Same as [`run`], reading credentials through `lookup`.
///
/// Credentials are checked before anything else; when one is missing no
/// client is built and the loop never starts.
async fn run_with<F>(args: Args, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup).map_err(|e| {
        tracing::error!(error = %e, "Missing required configuration");
        e
    })?;

    let mut config = load_config(args.config.as_deref())?;

    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(retry_interval) = args.retry_interval {
        config.retry_interval = retry_interval;
    }

    // Re-validate after overrides
    config.validate()?;

    tracing::info!(
        endpoint = %config.endpoint,
        retry_interval = config.retry_interval,
        chat_id = %credentials.chat_id,
        "Homework bot starting"
    );

    let source = PracticumClient::new(
        &config.endpoint,
        &credentials.practicum_token,
        config.request_timeout(),
    )?;
    let bot = TelegramBot::with_api_url(
        &credentials.telegram_token,
        &config.telegram_api_url,
        config.request_timeout(),
    )?;
    let notifier = Notifier::new(bot, &credentials.chat_id);

    let mut poller = Poller::new(source, notifier, config.retry_interval());

    if args.once {
        let outcome = poller.run_iteration().await;
        print_outcome(&outcome);
        return Ok(());
    }

    poller.run().await;
    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Ok(Config::load_from_file(path)?)
        }
        None => Ok(Config::load()?),
    }
}

/// Prints the result of a `--once` run.
fn print_outcome(outcome: &IterationOutcome) {
    match outcome {
        IterationOutcome::NoUpdates => println!("No new homework statuses"),
        IterationOutcome::Notified { sent, delivered } => {
            println!("Status changes: {sent} (delivered: {delivered})");
        }
        IterationOutcome::Failed { message, .. } => println!("{message}"),
    }
}
