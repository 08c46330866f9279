//! One-time seed price bootstrap.
//!
//! The simulation only touches the outside world once, to anchor the
//! synthetic market at a realistic BTC price. The fetch is fallible and
//! time-bounded; when every source fails the caller falls back to a random
//! price in a fixed band and the simulation starts anyway.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Prices outside this band are treated as API garbage.
const MAX_REASONABLE_PRICE: f64 = 1_000_000.0;

/// Per-source fetch timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Fallback band when no live source answers: 95k-100k.
const FALLBACK_BASE: f64 = 95_000.0;
const FALLBACK_SPREAD: f64 = 5_000.0;

#[async_trait]
pub trait SeedPriceSource: Send + Sync {
    /// Fetches a spot price to anchor the simulation. Must be time-bounded.
    async fn fetch(&self) -> Result<f64>;
}

/// Tries several public spot-price endpoints in order and returns the first
/// plausible answer.
pub struct HttpSeedPriceSource {
    client: reqwest::Client,
}

struct Endpoint {
    name: &'static str,
    url: &'static str,
    parse: fn(&Value) -> Option<f64>,
}

const ENDPOINTS: [Endpoint; 3] = [
    Endpoint {
        name: "CoinGecko",
        url: "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd",
        parse: |v| v["bitcoin"]["usd"].as_f64(),
    },
    Endpoint {
        name: "Binance",
        url: "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT",
        parse: |v| v["price"].as_str()?.parse().ok(),
    },
    Endpoint {
        name: "Coinbase",
        url: "https://api.coinbase.com/v2/prices/BTC-USD/spot",
        parse: |v| v["data"]["amount"].as_str()?.parse().ok(),
    },
];

impl HttpSeedPriceSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for seed price fetch")?;
        Ok(Self { client })
    }

    async fn try_endpoint(&self, endpoint: &Endpoint) -> Result<f64> {
        let response = self
            .client
            .get(endpoint.url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("{} request failed", endpoint.name))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", endpoint.name))?;

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("{} returned invalid JSON", endpoint.name))?;

        let price = (endpoint.parse)(&body)
            .ok_or_else(|| anyhow!("{} response missing price field", endpoint.name))?;

        anyhow::ensure!(
            price.is_finite() && price > 0.0 && price < MAX_REASONABLE_PRICE,
            "{} returned an implausible price: {}",
            endpoint.name,
            price
        );
        Ok(price)
    }
}

#[async_trait]
impl SeedPriceSource for HttpSeedPriceSource {
    async fn fetch(&self) -> Result<f64> {
        for endpoint in &ENDPOINTS {
            match self.try_endpoint(endpoint).await {
                Ok(price) => {
                    info!(source = endpoint.name, price, "seed price fetched");
                    return Ok(price);
                }
                Err(error) => {
                    warn!(source = endpoint.name, %error, "seed price source failed");
                }
            }
        }
        Err(anyhow!("all seed price sources failed"))
    }
}

/// Random price in the fallback band.
pub fn fallback_seed_price<R: Rng>(rng: &mut R) -> f64 {
    FALLBACK_BASE + rng.random::<f64>() * FALLBACK_SPREAD
}

/// Fetches a seed price, substituting the bounded fallback when the source
/// fails. Always returns a valid positive price.
pub async fn resolve_seed_price<R: Rng>(source: &dyn SeedPriceSource, rng: &mut R) -> f64 {
    match source.fetch().await {
        Ok(price) => price,
        Err(error) => {
            let fallback = fallback_seed_price(rng);
            warn!(%error, fallback, "no live seed price, using fallback");
            fallback
        }
    }
}
