use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use retrieval_chat_core::{Config, SearchType};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "retrieval-chat")]
#[command(version, about = "Terminal chat client for a document retrieval service")]
struct Cli {
    /// Base URL of the retrieval service
    #[arg(long, env = "RETRIEVAL_CHAT_URL")]
    url: Option<String>,

    /// Search type: focused, detailed or timeline
    #[arg(long)]
    search_type: Option<String>,

    /// Request deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.clone())?;

    let config = build_config(&cli)?;
    info!(url = %config.base_url, search_type = config.search_type.as_str(), "starting");

    // Setup terminal
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, config).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, config: Config) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(config, events.sender())?;

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        }
    }

    info!("shutting down");
    Ok(())
}

/// File config, then `RETRIEVAL_CHAT_URL`, then command-line flags.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config file");
        Config::new()
    });
    config.apply_env();

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(search_type) = &cli.search_type {
        config.search_type = SearchType::from_str(search_type)
            .ok_or_else(|| anyhow!("unknown search type '{}'", search_type))?;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing subscriber with environment filter.
///
/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?
            .join("retrieval-chat")
            .join("retrieval-chat.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("retrieval_chat=info,retrieval_chat_core=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
