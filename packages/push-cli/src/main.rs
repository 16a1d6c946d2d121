//! Operator CLI for action-queue push events
//!
//! Inspects a login's events on the push server, assembles events offline
//! from dry-run files, and uploads or removes them. Results go to stdout as
//! JSON; logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use action_queue::{build_events, ActionEffect, ExecutionOutput, WalletTable};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use push_client::{LoginId, LoginStatus, NewPushEvent, PushClient, PushConfig, PushMessage};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aq-push")]
#[command(about = "Action-queue push event CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether every event has triggered or completed
    Check {
        /// Base64 login id
        #[arg(long)]
        login_id: String,
        #[arg(required = true)]
        event_ids: Vec<String>,
    },

    /// Show every event the server holds for a login
    Status {
        #[arg(long)]
        login_id: String,
    },

    /// Assemble push events from a dry-run file without uploading
    Plan {
        #[arg(long)]
        program_id: String,
        /// JSON map of walletId -> currency info
        #[arg(long)]
        wallets: PathBuf,
        /// JSON file with `initEffect`, `outputs` and optional `pushMessage`
        #[arg(long)]
        dryrun: PathBuf,
    },

    /// Upload events produced by `plan`
    Upload {
        #[arg(long)]
        login_id: String,
        #[arg(long)]
        events: PathBuf,
    },

    /// Remove events from the server
    Remove {
        #[arg(long)]
        login_id: String,
        #[arg(required = true)]
        event_ids: Vec<String>,
    },
}

/// Dry-run file consumed by `plan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DryrunFile {
    init_effect: ActionEffect,
    outputs: Vec<ExecutionOutput>,
    #[serde(default)]
    push_message: Option<PushMessage>,
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<LoginStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<NewPushEvent>>,
}

impl Response {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            settled: None,
            status: None,
            events: None,
        }
    }
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,action_queue=debug,push_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            login_id,
            event_ids,
        } => cmd_check(&login_id, &event_ids).await,
        Commands::Status { login_id } => cmd_status(&login_id).await,
        Commands::Plan {
            program_id,
            wallets,
            dryrun,
        } => cmd_plan(&program_id, &wallets, &dryrun).await,
        Commands::Upload { login_id, events } => cmd_upload(&login_id, &events).await,
        Commands::Remove {
            login_id,
            event_ids,
        } => cmd_remove(&login_id, &event_ids).await,
    }
}

fn get_client() -> Result<PushClient> {
    let config = PushConfig::from_env().context("Failed to load push server configuration")?;
    tracing::info!(base_url = %config.base_url, "Using push server");
    Ok(PushClient::new(config))
}

fn parse_login_id(encoded: &str) -> Result<LoginId> {
    LoginId::from_base64(encoded).context("--login-id must be base64")
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_check(login_id: &str, event_ids: &[String]) -> Result<()> {
    let client = get_client()?;
    let login_id = parse_login_id(login_id)?;

    let settled = client.check_events(&login_id, event_ids).await?;

    output(&Response {
        settled: Some(settled),
        ..Response::ok()
    })
}

async fn cmd_status(login_id: &str) -> Result<()> {
    let client = get_client()?;
    let login_id = parse_login_id(login_id)?;

    let status = client.login_status(&login_id).await?;

    output(&Response {
        status: Some(status),
        ..Response::ok()
    })
}

async fn cmd_plan(program_id: &str, wallets: &Path, dryrun: &Path) -> Result<()> {
    let wallets: WalletTable = read_json(wallets)?;
    let dryrun: DryrunFile = read_json(dryrun)?;
    tracing::info!(
        wallets = wallets.len(),
        steps = dryrun.outputs.len(),
        "Loaded dry run"
    );

    let events = build_events(
        &wallets,
        program_id,
        &dryrun.init_effect,
        &dryrun.outputs,
        dryrun.push_message.as_ref(),
    )
    .await
    .context("Failed to assemble push events")?;

    output(&Response {
        events: Some(events),
        ..Response::ok()
    })
}

async fn cmd_upload(login_id: &str, events: &Path) -> Result<()> {
    let client = get_client()?;
    let login_id = parse_login_id(login_id)?;
    let events: Vec<NewPushEvent> = read_json(events)?;

    client.upload_events(&login_id, &events).await?;

    output(&Response {
        message: Some(format!("Uploaded {} events", events.len())),
        ..Response::ok()
    })
}

async fn cmd_remove(login_id: &str, event_ids: &[String]) -> Result<()> {
    let client = get_client()?;
    let login_id = parse_login_id(login_id)?;

    client.remove_events(&login_id, event_ids).await?;

    output(&Response {
        message: Some(format!("Removed {} events", event_ids.len())),
        ..Response::ok()
    })
}
