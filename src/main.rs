//! Entry point. Wires input -> Parser -> Validation -> Classifier -> Journal.

mod classifier;
mod config;
mod error;
mod journal;
mod parser;
mod types;
mod utils;
mod validate;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{path::PathBuf, time::Duration};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::journal::Journal;
use crate::types::{RawLeg, StrategyLabel, TradeSubmission};
use crate::validate::TradeValidator;

#[derive(Debug, Parser)]
#[command(name = "options-journal", version, about = "Options trade journal with strategy detection")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "OPTIONS_JOURNAL_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a JSON array of legs from stdin and print the detected strategy.
    Classify,
    /// Record a trade from a JSON submission file.
    Add {
        file: PathBuf,
        /// Attachment to copy alongside the trade (repeatable).
        #[arg(long = "attach")]
        attach: Vec<PathBuf>,
    },
    /// Print recorded trades, newest first.
    List {
        /// Group by earliest leg expiration.
        #[arg(long)]
        grouped: bool,
    },
    Show {
        id: u64,
    },
    Delete {
        id: u64,
    },
    /// Record quick-entry trade lines read from stdin.
    Ingest,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;
    let validator = TradeValidator::new(&cfg.validation);

    match cli.command {
        Command::Classify => {
            let label = classify_from(tokio::io::stdin()).await?;
            println!("{}", label);
        }
        Command::Add { file, attach } => {
            let s = std::fs::read_to_string(&file)
                .with_context(|| format!("read submission {}", file.display()))?;
            let mut sub: TradeSubmission = serde_json::from_str(&s)
                .with_context(|| format!("parse submission {}", file.display()))?;
            sub.attachments.extend(attach);

            let mut journal = Journal::load(&cfg.journal.path)?;
            let rec = journal.add(sub, &validator, &cfg.attachments.dir)?;
            println!("{}", serde_json::to_string_pretty(rec)?);
            journal.save(&cfg.journal.path)?;
        }
        Command::List { grouped } => {
            let journal = Journal::load(&cfg.journal.path)?;
            let out = if grouped {
                serde_json::to_string_pretty(&journal.grouped_by_expiration())?
            } else {
                serde_json::to_string_pretty(&journal.list())?
            };
            println!("{}", out);
        }
        Command::Show { id } => {
            let journal = Journal::load(&cfg.journal.path)?;
            let Some(rec) = journal.get(id) else {
                bail!("trade {} not found", id);
            };
            println!("{}", serde_json::to_string_pretty(rec)?);
        }
        Command::Delete { id } => {
            let mut journal = Journal::load(&cfg.journal.path)?;
            journal.delete(id)?;
            journal.save(&cfg.journal.path)?;
        }
        Command::Ingest => ingest(&cfg, &validator).await?,
    }
    Ok(())
}

/// Read a JSON array of legs to the end of `reader` and classify it.
async fn classify_from<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<StrategyLabel> {
    let mut input = String::new();
    reader.read_to_string(&mut input).await?;
    let legs: Vec<RawLeg> = serde_json::from_str(&input).context("parse legs JSON")?;
    Ok(classifier::classify(&legs)?)
}

/// Stdin lines -> MPSC -> journal; flushed on a ticker and at end of input.
async fn ingest(cfg: &AppConfig, validator: &TradeValidator) -> anyhow::Result<()> {
    let mut journal = Journal::load(&cfg.journal.path)?;

    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(1024);
    let reader_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("stdin read failed: {:#}", e);
                    break;
                }
            }
        }
    });

    info!(
        "Ingest started. Journal={}, DryRun={}, FlushEvery={}s",
        cfg.journal.path.display(),
        cfg.ingest.dry_run,
        cfg.journal.flush_interval_sec
    );

    let mut flush_ticker =
        tokio::time::interval(Duration::from_secs(cfg.journal.flush_interval_sec));
    let mut dirty = false;

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(raw) = maybe else { break; };
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some(sub) = parser::parse_trade(line) else {
                    warn!("Unrecognized trade line: {}", line);
                    continue;
                };

                if cfg.ingest.dry_run {
                    if let Err(e) = validator.pre_check(&sub) {
                        error!("[DRY-RUN] {} rejected: {:#}", sub.underlying, e);
                        continue;
                    }
                    match classifier::classify(&sub.legs) {
                        Ok(label) => info!("[DRY-RUN] {} {} legs -> {}", sub.underlying, sub.legs.len(), label),
                        Err(e) => error!("[DRY-RUN] {} rejected: {:#}", sub.underlying, e),
                    }
                    continue;
                }

                match journal.add(sub, validator, &cfg.attachments.dir) {
                    Ok(rec) => {
                        info!("{} #{} -> {}", rec.underlying, rec.id, rec.strategy);
                        dirty = true;
                    }
                    Err(e) => error!("trade rejected: {:#}", e),
                }
            }

            _ = flush_ticker.tick() => {
                if dirty {
                    match journal.save(&cfg.journal.path) {
                        Ok(()) => {
                            dirty = false;
                            info!("Journal flushed");
                        }
                        Err(e) => error!("journal save failed: {:#}", e),
                    }
                }
            }
        }
    }

    let _ = reader_handle.await;
    if dirty {
        journal.save(&cfg.journal.path)?;
    }
    info!("Ingest finished: {} trades in journal", journal.trades.len());
    Ok(())
}
