use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{ConsumerConfig, DEFAULT_SOURCE_PATH, DEFAULT_STORE_PATH};
use crate::consumer::PollLoop;
use crate::db::InsightStore;

mod config;
mod consumer;
mod db;
mod engagement;
mod error;
mod models;
mod report;
mod seen;
mod source;

#[derive(Parser)]
#[command(name = "engagement-insights")]
#[command(about = "Scores chat messages from a JSON-lines feed and stores engagement insights", long_about = None)]
struct Cli {
    /// JSON-lines file to poll
    #[arg(long, global = true, default_value = DEFAULT_SOURCE_PATH)]
    source: PathBuf,
    /// SQLite database receiving insights
    #[arg(long, global = true, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and store insights until interrupted (default)
    Run {
        /// Delay between polls [default: 2000]
        #[arg(long)]
        poll_interval_ms: Option<u64>,
        /// Message keys remembered for dedup [default: 1024]
        #[arg(long)]
        seen_capacity: Option<usize>,
    },
    /// Create the insight store schema
    InitDb,
    /// Score a single sentiment and message length
    Score {
        #[arg(long, allow_hyphen_values = true)]
        sentiment: f64,
        #[arg(long, allow_hyphen_values = true)]
        length: i64,
    },
    /// Generate a markdown report of stored insights
    Report {
        #[arg(long, default_value = "engagement_report.md")]
        out: PathBuf,
    },
    /// Export stored insights to CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let command = cli.command.unwrap_or(Commands::Run {
        poll_interval_ms: None,
        seen_capacity: None,
    });

    match command {
        Commands::Run {
            poll_interval_ms,
            seen_capacity,
        } => {
            let mut config = ConsumerConfig {
                source_path: cli.source,
                store_path: cli.store,
                ..ConsumerConfig::default()
            };
            if let Some(ms) = poll_interval_ms {
                config.poll_interval = Duration::from_millis(ms);
            }
            if let Some(capacity) = seen_capacity {
                config.seen_capacity = capacity;
            }

            info!("=== Engagement Insights Consumer ===");
            info!(
                source = %config.source_path.display(),
                store = %config.store_path.display(),
                poll_interval_ms = config.poll_interval.as_millis() as u64,
                "press Ctrl+C to stop"
            );

            let mut consumer = PollLoop::new(config)
                .await
                .context("failed to start consumer")?;
            consumer.run(shutdown_signal()).await;
        }
        Commands::InitDb => {
            InsightStore::initialize(&cli.store).await?;
            println!("Schema ready at {}.", cli.store.display());
        }
        Commands::Score { sentiment, length } => {
            let (score, level) = engagement::compute(sentiment, length);
            println!("score {score:.2} ({level})");
        }
        Commands::Report { out } => {
            let records = open_store(&cli.store).await?.fetch_insights().await?;
            std::fs::write(&out, report::build_report(&records))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { csv } => {
            let records = open_store(&cli.store).await?.fetch_insights().await?;
            report::export_csv(&records, &csv)
                .with_context(|| format!("failed to write {}", csv.display()))?;
            println!("Exported {} insights to {}.", records.len(), csv.display());
        }
    }

    Ok(())
}

async fn open_store(path: &std::path::Path) -> anyhow::Result<InsightStore> {
    InsightStore::initialize(path)
        .await
        .with_context(|| format!("failed to open insight store {}", path.display()))
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("consumer stopped by user");
}
