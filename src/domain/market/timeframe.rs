use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart timeframes supported by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneSec,
    TenSec,
    ThirtySec,
    OneMin,
    FiveMin,
    FifteenMin,
}

impl Timeframe {
    /// Returns the duration of this timeframe in milliseconds.
    pub fn interval_ms(&self) -> i64 {
        match self {
            Timeframe::OneSec => 1_000,
            Timeframe::TenSec => 10_000,
            Timeframe::ThirtySec => 30_000,
            Timeframe::OneMin => 60_000,
            Timeframe::FiveMin => 300_000,
            Timeframe::FifteenMin => 900_000,
        }
    }

    /// Returns the start timestamp (ms) of the bucket containing `timestamp_ms`.
    ///
    /// Buckets are aligned to interval boundaries, so a 5m bucket always
    /// starts at :00, :05, :10 and so on.
    pub fn bucket_start(&self, timestamp_ms: i64) -> i64 {
        let interval = self.interval_ms();
        timestamp_ms - timestamp_ms.rem_euclid(interval)
    }

    /// All supported timeframes in ascending order.
    pub fn all() -> [Timeframe; 6] {
        [
            Timeframe::OneSec,
            Timeframe::TenSec,
            Timeframe::ThirtySec,
            Timeframe::OneMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneSec => "1s",
            Timeframe::TenSec => "10s",
            Timeframe::ThirtySec => "30s",
            Timeframe::OneMin => "1m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1s" => Ok(Timeframe::OneSec),
            "10s" => Ok(Timeframe::TenSec),
            "30s" => Ok(Timeframe::ThirtySec),
            "1m" | "1min" => Ok(Timeframe::OneMin),
            "5m" | "5min" => Ok(Timeframe::FiveMin),
            "15m" | "15min" => Ok(Timeframe::FifteenMin),
            _ => Err(anyhow!(
                "Invalid timeframe: '{}'. Valid options: 1s, 10s, 30s, 1m, 5m, 15m",
                s
            )),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
