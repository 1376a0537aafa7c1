//! Classbell CLI: serve the fan-out service, run one-off scans, or tail a
//! user's notification feed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use classbell_core::ClassbellConfig;
use classbell_feed::{FeedSubscriber, FeedView};
use classbell_functions::{schedule, Deliverer};
use classbell_functions::class_start_scan::run_class_start_scan;
use classbell_functions::deadline_scan::run_deadline_scan;
use classbell_gateway::AppState;
use classbell_push::{HttpPush, PushTransport, RecordingPush};
use classbell_store::{DocumentStore, MemoryStore, SqliteStore};

#[derive(Parser)]
#[command(
    name = "classbell",
    version,
    about = "Notification fan-out service for the Classbell classroom app"
)]
struct Cli {
    /// Config file path (default: ~/.classbell/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the trigger gateway and both scan schedulers.
    Serve {
        /// In-memory store and recording push transport; nothing persists.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single scan immediately and exit.
    Scan {
        #[arg(value_enum)]
        which: ScanKind,
    },
    /// Subscribe to a user's notification feed and print it as it updates.
    Feed { user_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanKind {
    Deadline,
    ClassStart,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ClassbellConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClassbellConfig::load().context("loading config")?,
    };

    match cli.command {
        Command::Serve { dry_run } => serve(config, dry_run).await,
        Command::Scan { which } => run_scan(config, which).await,
        Command::Feed { user_id } => tail_feed(config, &user_id).await,
    }
}

fn open_store(config: &ClassbellConfig, dry_run: bool) -> Result<Arc<dyn DocumentStore>> {
    if dry_run {
        tracing::info!("Dry run: using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::open(Path::new(&config.store.db_path))
        .with_context(|| format!("opening store at {}", config.store.db_path))?;
    Ok(Arc::new(store))
}

fn push_transport(config: &ClassbellConfig, dry_run: bool) -> Arc<dyn PushTransport> {
    if dry_run || !config.push.enabled || config.push.server_key.is_empty() {
        tracing::info!("Push delivery disabled: recording transport in use");
        Arc::new(RecordingPush::new())
    } else {
        Arc::new(HttpPush::new(&config.push.endpoint, &config.push.server_key))
    }
}

async fn serve(config: ClassbellConfig, dry_run: bool) -> Result<()> {
    let store = open_store(&config, dry_run)?;
    let push = push_transport(&config, dry_run);

    let handles = schedule::spawn_scans(
        store.clone(),
        push.clone(),
        &config.scan,
        &config.push.icon_url,
    );

    let deliverer = Deliverer::new(store.clone(), push, &config.push.icon_url);
    let state = AppState { store, deliverer };
    let result = classbell_gateway::serve(state, &config.gateway.host, config.gateway.port).await;

    for handle in handles {
        handle.abort();
    }
    result.context("gateway exited")
}

async fn run_scan(config: ClassbellConfig, which: ScanKind) -> Result<()> {
    let store = open_store(&config, false)?;
    let push = push_transport(&config, false);
    let deliverer = Deliverer::new(store.clone(), push, &config.push.icon_url);

    let delivered = match which {
        ScanKind::Deadline => {
            run_deadline_scan(
                &store,
                &deliverer,
                chrono::Utc::now(),
                config.scan.deadline_lookahead_hours,
            )
            .await?
        }
        ScanKind::ClassStart => {
            run_class_start_scan(
                &store,
                &deliverer,
                chrono::Local::now().naive_local(),
                config.scan.class_start_lookahead_mins,
            )
            .await?
        }
    };
    println!("Delivered {delivered} reminder(s)");
    Ok(())
}

async fn tail_feed(config: ClassbellConfig, user_id: &str) -> Result<()> {
    let store = open_store(&config, false)?;
    let subscriber = FeedSubscriber::new(store, user_id);
    let mut sink = |view: FeedView| print_view(&view);
    subscriber.run(&mut sink).await;
    Ok(())
}

fn print_view(view: &FeedView) {
    println!("----------------------------------------");
    match view {
        FeedView::Empty { placeholder } => println!("{placeholder}"),
        FeedView::Items(items) => {
            for item in items {
                let marker = if item.unread { "*" } else { " " };
                println!("{marker} {} ({})", item.message, item.timestamp_label);
            }
        }
    }
}
