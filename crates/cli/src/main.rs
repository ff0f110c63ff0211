mod args;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use figment::providers::Serialized;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crossgrab_core::{
    create_torrent_client, load_config, validate_config, Config, Fetcher, HeuristicNameParser,
    HistoryStore, HttpDownloader, JackettSearcher, Orchestrator, SanitizedConfig, Searcher,
    ShortcutStyle, TorrentClient,
};

use args::Args;

/// Log-file filter when `RUST_LOG` is unset.
const DEFAULT_FILE_FILTER: &str = "info,crossgrab=debug,crossgrab_core=debug";

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref(), Serialized::defaults(args.overrides())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging.file) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Concise progress on stdout, full detail in the log file.
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {:?}", log_file))?;

    let console = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_filter(LevelFilter::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILE_FILTER.into()),
        );

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    Ok(())
}

async fn run(config: Config) -> Result<()> {
    validate_config(&config).context("Configuration validation failed")?;
    debug!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config))?
    );

    let searcher: Arc<dyn Searcher> = Arc::new(JackettSearcher::new(config.indexer.clone()));
    searcher
        .probe()
        .await
        .with_context(|| format!("Indexer at {} is unreachable", config.indexer.url))?;
    info!("Using {} indexer at {}", searcher.name(), config.indexer.url);

    let torrent_client: Option<Arc<dyn TorrentClient>> = match &config.torrent_client {
        Some(tc_config) => {
            let client = create_torrent_client(tc_config)
                .context("Failed to create torrent client")?;
            let methods = client
                .list_methods()
                .await
                .with_context(|| format!("Torrent client at {} is unreachable", tc_config.url))?;
            info!("Connected to {} at {}", client.name(), tc_config.url);
            debug!(methods = methods.len(), "Torrent client RPC methods");
            Some(client)
        }
        None => {
            info!("No torrent client configured");
            None
        }
    };

    let history = HistoryStore::open(&config.history.path).with_context(|| {
        format!("Failed to open search history {:?}", config.history.path)
    })?;

    let shortcut_style = config.shortcut_style.unwrap_or_else(ShortcutStyle::detect);
    let fetcher = Fetcher::new(
        Arc::new(HttpDownloader::new(config.indexer.timeout_secs)),
        &config.save_path,
        shortcut_style,
    );

    let mut orchestrator = Orchestrator::new(
        config,
        searcher,
        torrent_client,
        fetcher,
        Arc::new(HeuristicNameParser::new()),
        history,
    );
    orchestrator.run().await.context("Run aborted")?;

    Ok(())
}
