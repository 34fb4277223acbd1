use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use campaign_leaderboard::{
    EngagementError, EngagementService, MemoryStore, SmartKeyVerifier, WindowPolicy,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "campaign-leaderboard")]
#[command(about = "Rank campaign participants by social engagement")]
struct Args {
    /// JSON snapshot of users and their tweets
    #[arg(long, env = "SNAPSHOT_PATH")]
    snapshot: PathBuf,

    /// Server-side secret shared by every user's smart key
    #[arg(long, env = "X_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// How the seven day window sits relative to now
    #[arg(long, env = "WINDOW_POLICY", value_enum, default_value_t = WindowPolicy::Forward)]
    window: WindowPolicy,

    /// Deadline for each store read in milliseconds
    #[arg(long, env = "STORE_READ_TIMEOUT_MS", default_value_t = 10_000)]
    read_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ranked users with positive impact
    Leaderboard,

    /// Metrics and rank for a profile id
    Dashboard { profile_id: String },

    /// Metrics and rank for a username, gated on its smart key
    Verify { username: String, key: String },

    /// Mint a smart key for a username
    IssueKey { username: String, plaintext: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("campaign_leaderboard={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = match MemoryStore::load(&args.snapshot).await {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = EngagementService::builder()
        .store(store)
        .verifier(SmartKeyVerifier::new(args.client_secret))
        .window_policy(args.window)
        .read_timeout(Duration::from_millis(args.read_timeout_ms))
        .build();

    let result = match &args.command {
        Command::Leaderboard => service.leaderboard().await.map(|b| print_json(&b)),
        Command::Dashboard { profile_id } => {
            service.dashboard(profile_id).await.map(|d| print_json(&d))
        }
        Command::Verify { username, key } => service
            .verify_smart_key(username, key)
            .await
            .map(|d| print_json(&d)),
        Command::IssueKey {
            username,
            plaintext,
        } => service
            .issue_smart_key(username, plaintext)
            .await
            .map(|key| print_json(&key)),
    };

    match result {
        Ok(code) => code,
        Err(e @ EngagementError::NotFound { .. }) => {
            error!("{}", e);
            ExitCode::from(10)
        }
        Err(e) if e.is_auth_failure() => {
            error!("{}", e);
            ExitCode::from(11)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &impl Serialize) -> ExitCode {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            error!("unable to serialize output: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match writeln!(std::io::stdout(), "{}", json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
