//! Configuration for the simulation binary.
//!
//! Everything is loaded from environment variables (with a `.env` file picked
//! up by the binary), and every knob has a default so the simulator runs out
//! of the box. CLI flags override the environment.

use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;

const DEFAULT_INITIAL_BALANCE: Decimal = dec!(10);
const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_SNAPSHOT_EVERY_TICKS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    /// Starting account balance, in base-asset units.
    pub initial_balance: Decimal,
    /// Driver loop period. 100ms = 10 simulation steps per second.
    pub tick_interval_ms: u64,
    /// Pins the market path for reproducible runs; absent means OS entropy.
    pub rng_seed: Option<u64>,
    /// Skips the live seed-price fetch when set.
    pub seed_price: Option<f64>,
    /// Timeframe whose candles feed the snapshot and the pattern scanner.
    pub chart_timeframe: Timeframe,
    /// How often the binary logs a snapshot summary.
    pub snapshot_every_ticks: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let initial_balance = parse_var("INITIAL_BALANCE")?.unwrap_or(DEFAULT_INITIAL_BALANCE);
        let tick_interval_ms = parse_var("TICK_INTERVAL_MS")?.unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        let rng_seed = parse_var("RNG_SEED")?;
        let seed_price = parse_var("SEED_PRICE")?;
        let chart_timeframe = parse_var("CHART_TIMEFRAME")?.unwrap_or(Timeframe::OneSec);
        let snapshot_every_ticks =
            parse_var("SNAPSHOT_EVERY_TICKS")?.unwrap_or(DEFAULT_SNAPSHOT_EVERY_TICKS);

        let config = Self {
            initial_balance,
            tick_interval_ms,
            rng_seed,
            seed_price,
            chart_timeframe,
            snapshot_every_ticks,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants CLI overrides might have broken.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.initial_balance > Decimal::ZERO,
            "INITIAL_BALANCE must be positive, got {}",
            self.initial_balance
        );
        anyhow::ensure!(
            self.tick_interval_ms > 0,
            "TICK_INTERVAL_MS must be positive"
        );
        anyhow::ensure!(
            self.snapshot_every_ticks > 0,
            "SNAPSHOT_EVERY_TICKS must be positive"
        );
        if let Some(price) = self.seed_price {
            anyhow::ensure!(
                price.is_finite() && price > 0.0,
                "SEED_PRICE must be a positive number, got {}",
                price
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            rng_seed: None,
            seed_price: None,
            chart_timeframe: Timeframe::OneSec,
            snapshot_every_ticks: DEFAULT_SNAPSHOT_EVERY_TICKS,
        }
    }
}

/// Reads and parses one env var; unset or empty means None.
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .map(Some)
            .with_context(|| format!("Invalid {name}: '{raw}'")),
        _ => Ok(None),
    }
}
