//! calmirror-provider-google - Google Calendar destination for calmirror
//!
//! This binary implements the calmirror provider protocol, reading one JSON
//! request per line from stdin and answering on stdout.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/calmirror/providers/google/app_config.toml
//!   ~/.config/calmirror/providers/google/tokens/{account}.json

mod app_config;
mod commands;
mod google_error;
mod google_event;
mod session;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use calmirror_core::protocol::{Command, ErrorKind, Request, Response};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries protocol responses only
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e), ErrorKind::Other),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    let command = request.command;
    let params = request.params;

    let result = match command {
        Command::Authenticate => commands::authenticate::handle(params).await,
        Command::GetTimeZone => commands::get_time_zone::handle(params).await,
        Command::ListEvents => commands::list_events::handle(params).await,
        Command::ListInstances => commands::list_instances::handle(params).await,
        Command::InsertEvent => commands::insert_event::handle(params).await,
        Command::UpdateEvent => commands::update_event::handle(params).await,
        Command::UpdateInstance => commands::update_instance::handle(params).await,
        Command::DeleteEvent => commands::delete_event::handle(params).await,
    };

    let result = result.and_then(|data| Ok(Response::success(data)?));

    match result {
        Ok(response) => response,
        Err(e) => {
            let kind = error_kind(&e);
            warn!(?command, ?kind, "{:#}", e);
            Response::error(&format!("{:#}", e), kind)
        }
    }
}

/// Connect failures and timeouts are reported as connectivity errors so
/// calmirror can tell an unreachable API from a rejected request.
fn error_kind(e: &anyhow::Error) -> ErrorKind {
    match google_error::find_client_error(e) {
        Some(client_error) if google_error::is_connectivity(client_error) => {
            ErrorKind::Connectivity
        }
        _ => ErrorKind::Other,
    }
}
