use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use papertrade::application::analysis::scanner::PatternScanner;
use papertrade::application::market_data::engine::MarketEngine;
use papertrade::application::orchestrator::Orchestrator;
use papertrade::application::trading::ledger::Ledger;
use papertrade::config::Config;
use papertrade::domain::market::timeframe::Timeframe;
use papertrade::infrastructure::seed::{HttpSeedPriceSource, resolve_seed_price};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

/// Synthetic BTC market with a leveraged paper-trading ledger.
#[derive(Debug, Parser)]
#[command(name = "papertrade", version, about)]
struct Cli {
    /// Seed price override; skips the live fetch.
    #[arg(long)]
    seed_price: Option<f64>,

    /// RNG seed for a reproducible market path.
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Starting account balance in base-asset units.
    #[arg(long)]
    balance: Option<Decimal>,

    /// Tick interval in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Chart timeframe fed to the pattern scanner (1s, 10s, 30s, 1m, 5m, 15m).
    #[arg(long, value_parser = Timeframe::from_str)]
    timeframe: Option<Timeframe>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(price) = cli.seed_price {
        config.seed_price = Some(price);
    }
    if let Some(seed) = cli.rng_seed {
        config.rng_seed = Some(seed);
    }
    if let Some(balance) = cli.balance {
        config.initial_balance = balance;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if let Some(timeframe) = cli.timeframe {
        config.chart_timeframe = timeframe;
    }
    config.validate()?;

    let seed_price = match config.seed_price {
        Some(price) => {
            info!(price, "using configured seed price");
            price
        }
        None => {
            let source = HttpSeedPriceSource::new()?;
            resolve_seed_price(&source, &mut rand::rng()).await
        }
    };

    let now_ms = Utc::now().timestamp_millis();
    let engine = MarketEngine::new(seed_price, now_ms, config.rng_seed);
    let ledger = Ledger::new(config.initial_balance);
    let scanner = PatternScanner::new();
    let mut orchestrator = Orchestrator::new(
        engine,
        ledger,
        scanner,
        config.chart_timeframe,
        now_ms,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    // Log a summary every N snapshots so the feed stays readable at 10Hz
    let mut snapshots = orchestrator.subscribe();
    let every = config.snapshot_every_ticks;
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.tick % every != 0 {
                continue;
            }
            info!(
                tick = snapshot.tick,
                price = snapshot.price,
                change_pct = snapshot.price_change_percent,
                trend = ?snapshot.trend,
                rsi = snapshot.rsi,
                shock = snapshot.shock_active,
                equity = %snapshot.account.equity,
                positions = snapshot.positions.len(),
                "market"
            );
            for pattern in &snapshot.patterns {
                info!(
                    kind = %pattern.pattern_type,
                    confidence = pattern.confidence,
                    "signal: {}",
                    pattern.message
                );
            }
        }
    });

    orchestrator
        .run(Duration::from_millis(config.tick_interval_ms), shutdown_rx)
        .await;

    let account = orchestrator.ledger().account();
    info!(
        balance = %account.balance,
        equity = %account.equity,
        trades = orchestrator.ledger().history().len(),
        "final account state"
    );
    Ok(())
}
