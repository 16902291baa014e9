use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::HttpRemoteService;
use controller::{ControllerConfig, Session};
use shared::domain::LlmProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{confirmation, into_events, Command, BUSY, HELP};
use config::{load_settings, normalize_server_url, Settings};
use render::{SharedState, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(about = "Ask questions about your data in plain language")]
struct Args {
    #[arg(long, default_value = "querydesk.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    llm_provider: Option<LlmProvider>,
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.server_url {
            settings.server_url = v;
        }
        if let Some(v) = self.llm_provider {
            settings.llm_provider = v;
        }
        if let Some(v) = self.request_timeout_secs {
            settings.request_timeout_secs = Some(v);
        }
        if let Some(v) = self.download_dir {
            settings.download_dir = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    args.apply(&mut settings);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let server_url = normalize_server_url(&settings.server_url)?;
    let remote = HttpRemoteService::with_timeout(&server_url, settings.request_timeout())?;
    info!(%server_url, provider = %settings.llm_provider, "querydesk starting");

    let state = SharedState::default();
    let renderer = TerminalRenderer::new(state.clone(), settings.download_dir.clone());
    let (session, handle) = Session::new(
        ControllerConfig {
            debounce: settings.debounce(),
            notice_ttl: settings.notice_ttl(),
            provider: settings.llm_provider,
        },
        Arc::new(remote),
        Box::new(renderer),
    );
    let session_task = tokio::spawn(session.run());

    println!("Connected to {server_url}. Type a question, or :help.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(table) = state.take_pending_removal() {
            handle.send(confirmation(line, table));
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Tables => println!("{}", state.tables_text()),
            command if command.edits_input() && state.query_locked() => println!("{BUSY}"),
            command => match into_events(command).await {
                Ok(events) => {
                    for event in events {
                        if !handle.send(event) {
                            warn!("session stopped; input ignored");
                        }
                    }
                }
                Err(err) => println!("error: {err:#}"),
            },
        }
    }

    drop(handle);
    session_task.await?;
    info!("querydesk stopped");
    Ok(())
}
